//! Persisted swap progress.
//!
//! A journal is the plan plus one completion marker per step. It exists on
//! disk only while a swap is in flight so an interrupted run can be resumed
//! instead of reconstructed by hand.

use serde::{Deserialize, Serialize};

use crate::color::Direction;
use crate::error::{Result, SwapError};
use crate::plan::{fingerprint_steps, SwapPlan};
use crate::resolve::ClusterPair;
use crate::state::ServiceRef;

pub const JOURNAL_SCHEMA_VERSION: &str = "v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalStep {
    pub service: ServiceRef,
    pub current: String,
    pub target: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapJournal {
    pub schema_version: String,
    pub blue_cluster: String,
    pub green_cluster: String,
    pub direction: Direction,
    pub plan_fingerprint: String,
    pub created_at: String,
    pub steps: Vec<JournalStep>,
}

impl SwapJournal {
    pub fn from_plan(clusters: &ClusterPair, plan: &SwapPlan, created_at: impl Into<String>) -> Self {
        Self {
            schema_version: JOURNAL_SCHEMA_VERSION.to_string(),
            blue_cluster: clusters.blue.id.clone(),
            green_cluster: clusters.green.id.clone(),
            direction: plan.direction,
            plan_fingerprint: plan.fingerprint(),
            created_at: created_at.into(),
            steps: plan
                .steps
                .iter()
                .map(|step| JournalStep {
                    service: step.service.clone(),
                    current: step.current.name.clone(),
                    target: step.target.name.clone(),
                    completed: false,
                })
                .collect(),
        }
    }

    /// File-name stem shared by every journal for the same cluster pair.
    pub fn key_for(clusters: &ClusterPair) -> String {
        format!(
            "{}__{}",
            sanitize(clusters.blue.short_name()),
            sanitize(clusters.green.short_name())
        )
    }

    pub fn belongs_to(&self, clusters: &ClusterPair) -> bool {
        self.blue_cluster == clusters.blue.id && self.green_cluster == clusters.green.id
    }

    pub fn total_steps(&self) -> usize {
        self.steps.len()
    }

    pub fn completed_steps(&self) -> usize {
        self.steps.iter().filter(|step| step.completed).count()
    }

    pub fn is_finished(&self) -> bool {
        self.steps.iter().all(|step| step.completed)
    }

    /// Indices of steps still to apply, in plan order.
    pub fn pending_indices(&self) -> Vec<usize> {
        self.steps
            .iter()
            .enumerate()
            .filter(|(_, step)| !step.completed)
            .map(|(index, _)| index)
            .collect()
    }

    pub fn mark_completed(&mut self, index: usize) -> Result<()> {
        let step = self.steps.get_mut(index).ok_or_else(|| {
            SwapError::journal(format!("step {} does not exist in the journal", index + 1))
        })?;
        step.completed = true;
        Ok(())
    }

    pub fn verify(&self) -> Result<()> {
        if self.schema_version != JOURNAL_SCHEMA_VERSION {
            return Err(SwapError::journal(format!(
                "unsupported journal schema '{}' (expected '{JOURNAL_SCHEMA_VERSION}')",
                self.schema_version
            )));
        }

        let recomputed = fingerprint_steps(
            self.direction,
            self.steps
                .iter()
                .map(|step| (&step.service, step.current.as_str(), step.target.as_str())),
        );
        if recomputed != self.plan_fingerprint {
            return Err(SwapError::journal(
                "journal steps do not match the recorded plan fingerprint",
            ));
        }

        Ok(())
    }

    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec_pretty(self)
            .map_err(|error| SwapError::journal(format!("failed to encode journal: {error}")))
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let journal: Self = serde_json::from_slice(bytes)
            .map_err(|error| SwapError::journal(format!("failed to decode journal: {error}")))?;
        journal.verify()?;
        Ok(journal)
    }

    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.steps.len() + 2);
        lines.push(format!(
            "Unfinished swap ({}) started {}: {} of {} updates applied",
            self.direction,
            self.created_at,
            self.completed_steps(),
            self.total_steps()
        ));
        for (index, step) in self.steps.iter().enumerate() {
            lines.push(format!(
                "  {:>2}. [{}] {}: {} -> {}",
                index + 1,
                if step.completed { "done" } else { "pending" },
                step.service,
                short(&step.current),
                short(&step.target)
            ));
        }
        lines.join("\n")
    }
}

fn short(name: &str) -> &str {
    name.rsplit_once('/').map_or(name, |(_, tail)| tail)
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '-' { ch } else { '_' })
        .collect()
}
