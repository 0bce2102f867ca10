//! Error taxonomy for identity swaps.
//!
//! Resolution and consistency failures are raised before any mutating call
//! is issued. Execution and routing failures can happen after the platform or
//! the object store has already been changed.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SwapError>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SwapError {
    /// A cluster, service, definition or type could not be uniquely identified.
    #[error("resolution error: {0}")]
    Resolution(String),

    /// The discovered state does not satisfy the requested direction.
    #[error("state consistency error: {0}")]
    StateConsistency(String),

    /// Update `step` of `total` was rejected; earlier steps are already applied.
    #[error("execution error: update {step} of {total} failed for {service}: {message}")]
    Execution {
        step: usize,
        total: usize,
        service: String,
        message: String,
    },

    #[error(transparent)]
    RoutingUpdate(#[from] RoutingUpdateError),

    #[error("journal error: {0}")]
    Journal(String),

    #[error("prompt error: {0}")]
    Prompt(String),
}

impl SwapError {
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    pub fn state_consistency(msg: impl Into<String>) -> Self {
        Self::StateConsistency(msg.into())
    }

    pub fn journal(msg: impl Into<String>) -> Self {
        Self::Journal(msg.into())
    }

    pub fn prompt(msg: impl Into<String>) -> Self {
        Self::Prompt(msg.into())
    }

    /// True for failures raised before anything was mutated.
    pub fn is_fail_closed(&self) -> bool {
        matches!(self, Self::Resolution(_) | Self::StateConsistency(_))
    }
}

/// Failures while republishing routing documents.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RoutingUpdateError {
    #[error("routing update error: failed to download '{key}': {message}")]
    Download { key: String, message: String },

    #[error("routing update error: failed to upload '{key}': {message}")]
    Upload { key: String, message: String },

    #[error("routing update error: '{key}' is not a usable document: {message}")]
    Malformed { key: String, message: String },

    #[error("routing update error: environment '{name}' is neither the blue nor the green environment")]
    UnknownEnvironment { name: String },

    /// The stored object changed between download and upload.
    #[error("routing update error: '{key}' was modified concurrently; upload rejected")]
    Conflict { key: String },
}
