pub mod execute;
pub mod inspect;
pub mod routing_update;
pub mod swap;
