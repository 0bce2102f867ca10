use chrono::{SecondsFormat, Utc};
use identity_swap_core::routing::{EnvironmentColors, DEFAULT_ROUTING_KEY};
use identity_swap_core::{build_swap_plan, resolve_cluster_pair, Direction, Result, SwapError, SwapJournal};

use crate::adapters::journal_store::JournalStore;
use crate::adapters::object_store::ObjectStore;
use crate::adapters::operator::Operator;
use crate::adapters::platform::OrchestrationPlatform;
use crate::handlers::execute::execute_journal;
use crate::handlers::inspect::inspect_service_state;
use crate::handlers::routing_update::{update_routing_documents, RoutingReport};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapRequest {
    /// Blue environment name; also the loose blue cluster identifier.
    pub blue: String,
    /// Green environment name; also the loose green cluster identifier.
    pub green: String,
    pub direction: Direction,
    pub do_legacy: bool,
    pub routing_key: String,
}

impl SwapRequest {
    pub fn new(blue: impl Into<String>, green: impl Into<String>, direction: Direction) -> Self {
        Self {
            blue: blue.into(),
            green: green.into(),
            direction,
            do_legacy: false,
            routing_key: DEFAULT_ROUTING_KEY.to_string(),
        }
    }

    pub fn with_legacy(mut self, do_legacy: bool) -> Self {
        self.do_legacy = do_legacy;
        self
    }
}

/// The prompt the operator declined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Checkpoint {
    StateReview,
    PlanReview,
    ResumeReview,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwapOutcome {
    Completed { plan_steps: usize, routing: RoutingReport },
    Declined(Checkpoint),
}

pub const STATE_PROMPT: &str = "Is this the expected current state?";
pub const PLAN_PROMPT: &str = "Apply this swap plan?";
pub const RESUME_PROMPT: &str = "Resume the unfinished swap?";

/// Resolve, inspect, plan, execute and re-point routing for one cluster pair.
///
/// Nothing is mutated until the operator has accepted both the current state
/// and the plan, and the journal has been written. An unfinished journal for
/// the same pair takes precedence over planning a fresh swap, and must have
/// been recorded for the requested direction.
pub fn run_identity_swap(
    request: &SwapRequest,
    platform: &impl OrchestrationPlatform,
    store: &impl ObjectStore,
    journals: &impl JournalStore,
    operator: &mut impl Operator,
) -> Result<SwapOutcome> {
    let cluster_names = platform
        .list_clusters()
        .map_err(|error| SwapError::resolution(format!("cannot list clusters: {error}")))?;
    let clusters = resolve_cluster_pair(&request.blue, &request.green, &cluster_names)?;
    tracing::info!(blue = %clusters.blue, green = %clusters.green, "resolved cluster pair");

    let journal_key = SwapJournal::key_for(&clusters);
    let environments = EnvironmentColors::new(request.blue.clone(), request.green.clone());

    if let Some(mut journal) = journals.load(&journal_key)? {
        if !journal.belongs_to(&clusters) {
            return Err(SwapError::journal(format!(
                "{} records clusters {} and {}, not {} and {}",
                journals.location(&journal_key),
                journal.blue_cluster,
                journal.green_cluster,
                clusters.blue.id,
                clusters.green.id
            )));
        }

        if journal.direction != request.direction {
            tracing::warn!(
                recorded = %journal.direction,
                requested = %request.direction,
                "unfinished swap runs the other way"
            );
            return Err(SwapError::journal(format!(
                "{} records an unfinished {} swap but {} was requested; rerun with the recorded direction or remove the journal",
                journals.location(&journal_key),
                journal.direction,
                request.direction
            )));
        }

        operator.show(&journal.render())?;
        if !operator.confirm(RESUME_PROMPT)? {
            operator.show(&format!(
                "Nothing was changed. The unfinished swap is still recorded in {}.",
                journals.location(&journal_key)
            ))?;
            return Ok(SwapOutcome::Declined(Checkpoint::ResumeReview));
        }

        tracing::info!(
            completed = journal.completed_steps(),
            total = journal.total_steps(),
            "resuming unfinished swap"
        );
        let plan_steps = journal.total_steps();
        execute_journal(platform, &mut journal, journals, &journal_key, operator)?;
        return finish_with_routing(request, store, operator, &environments, plan_steps);
    }

    let state = inspect_service_state(platform, &clusters)?;
    operator.show(&state.render())?;
    if !operator.confirm(STATE_PROMPT)? {
        return Ok(SwapOutcome::Declined(Checkpoint::StateReview));
    }

    let definitions = platform.list_workload_definitions().map_err(|error| {
        SwapError::resolution(format!("cannot list workload definitions: {error}"))
    })?;
    let plan = build_swap_plan(&state, &definitions, request.direction)?;
    tracing::info!(direction = %plan.direction, steps = plan.len(), "built swap plan");

    operator.show(&plan.render())?;
    if !operator.confirm(PLAN_PROMPT)? {
        return Ok(SwapOutcome::Declined(Checkpoint::PlanReview));
    }

    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
    let mut journal = SwapJournal::from_plan(&clusters, &plan, created_at);
    journals.save(&journal_key, &journal)?;
    tracing::info!(location = %journals.location(&journal_key), "swap journal written");

    execute_journal(platform, &mut journal, journals, &journal_key, operator)?;
    finish_with_routing(request, store, operator, &environments, plan.len())
}

fn finish_with_routing(
    request: &SwapRequest,
    store: &impl ObjectStore,
    operator: &mut impl Operator,
    environments: &EnvironmentColors,
    plan_steps: usize,
) -> Result<SwapOutcome> {
    let routing = update_routing_documents(
        store,
        operator,
        &request.routing_key,
        environments,
        request.do_legacy,
    )?;
    operator.show(&routing.render())?;
    Ok(SwapOutcome::Completed { plan_steps, routing })
}
