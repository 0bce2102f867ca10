//! Deterministic blue/green identity-swap primitives.
//!
//! This crate owns classification, cluster resolution, swap planning, the
//! swap journal model and routing-document transforms. It intentionally
//! excludes AWS SDK, terminal and filesystem concerns; those live in
//! `identity_swap_aws`.

pub mod classify;
pub mod color;
pub mod error;
pub mod journal;
pub mod plan;
pub mod resolve;
pub mod routing;
pub mod state;

pub use classify::{classify_definition, ServiceType, WorkloadDefinition};
pub use color::{Color, Direction};
pub use error::{Result, RoutingUpdateError, SwapError};
pub use journal::SwapJournal;
pub use plan::{build_swap_plan, PlanStep, SwapPlan};
pub use resolve::{resolve_cluster, resolve_cluster_pair, Cluster, ClusterPair};
pub use state::{ServiceAssignment, ServiceRef, ServiceState};
