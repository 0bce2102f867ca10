pub mod ecs;
pub mod journal_store;
pub mod object_store;
pub mod operator;
pub mod platform;
pub mod s3;
