//! AWS-oriented adapters and handlers for blue/green identity swaps.
//!
//! This crate owns runtime integration details (ECS and S3 adapters, the
//! operator terminal, the on-disk journal) and the handlers that drive one
//! swap run through them. Planning and classification stay in
//! `identity_swap_core`.

pub mod adapters;
pub mod handlers;
pub mod settings;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;
