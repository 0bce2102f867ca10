//! Swap plan construction.
//!
//! Pure: given the merged service state, every workload definition in the
//! account and a direction, either produce a plan covering each service once
//! or fail before anything is mutated.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::classify::{classify_definition, WorkloadDefinition};
use crate::color::Direction;
use crate::error::{Result, SwapError};
use crate::state::{ServiceRef, ServiceState};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStep {
    pub service: ServiceRef,
    pub current: WorkloadDefinition,
    pub target: WorkloadDefinition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapPlan {
    pub direction: Direction,
    pub steps: Vec<PlanStep>,
}

impl SwapPlan {
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn target_for(&self, service: &ServiceRef) -> Option<&WorkloadDefinition> {
        self.steps
            .iter()
            .find(|step| &step.service == service)
            .map(|step| &step.target)
    }

    pub fn fingerprint(&self) -> String {
        fingerprint_steps(
            self.direction,
            self.steps
                .iter()
                .map(|step| (&step.service, step.current.name.as_str(), step.target.name.as_str())),
        )
    }

    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.steps.len() + 1);
        lines.push(format!(
            "Swap plan ({}, {} updates):",
            self.direction,
            self.steps.len()
        ));
        for (index, step) in self.steps.iter().enumerate() {
            lines.push(format!(
                "  {:>2}. {}: {} -> {}",
                index + 1,
                step.service,
                step.current,
                step.target
            ));
        }
        lines.join("\n")
    }
}

/// SHA-256 over `(direction, service, cluster, current, target)` lines.
pub fn fingerprint_steps<'a>(
    direction: Direction,
    steps: impl IntoIterator<Item = (&'a ServiceRef, &'a str, &'a str)>,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(direction.as_str());
    for (service, current, target) in steps {
        hasher.update(b"\n");
        hasher.update(format!(
            "{}|{}|{}|{}|{}",
            service.cluster, service.color, service.service, current, target
        ));
    }
    format!("{:x}", hasher.finalize())
}

pub fn build_swap_plan(
    state: &ServiceState,
    definitions: &[String],
    direction: Direction,
) -> Result<SwapPlan> {
    if state.is_empty() {
        return Err(SwapError::resolution("no services were discovered in either cluster"));
    }

    let current = classify_current_state(state)?;
    validate_mirror_kinds(&current, direction)?;
    validate_colors(&current)?;

    let candidates = classify_candidates(definitions);

    let mut steps = Vec::with_capacity(current.len());
    for (service, definition) in current {
        let wanted_color = definition.color.opposite();
        let wanted_mirror = direction.targets_mirror();

        let target = candidates
            .iter()
            .enumerate()
            .filter(|(_, candidate)| {
                candidate.is_mirror == wanted_mirror
                    && candidate.color == wanted_color
                    && candidate.service_type == definition.service_type
            })
            .max_by_key(|(index, candidate)| (candidate.revision, *index))
            .map(|(_, candidate)| candidate.clone())
            .ok_or_else(|| {
                SwapError::resolution(format!(
                    "no {} {} {} workload definition exists to replace {} on {service}",
                    wanted_color,
                    if wanted_mirror { "mirror" } else { "standard" },
                    definition.service_type,
                    definition
                ))
            })?;

        steps.push(PlanStep {
            service: service.clone(),
            current: definition,
            target,
        });
    }

    Ok(SwapPlan { direction, steps })
}

fn classify_current_state(state: &ServiceState) -> Result<Vec<(&ServiceRef, WorkloadDefinition)>> {
    let mut seen = HashSet::with_capacity(state.len());
    let mut classified = Vec::with_capacity(state.len());

    for assignment in &state.assignments {
        if !seen.insert(&assignment.service) {
            return Err(SwapError::resolution(format!(
                "service {} was discovered more than once",
                assignment.service
            )));
        }

        let definition = classify_definition(&assignment.definition).map_err(|error| {
            SwapError::resolution(format!("service {}: {error}", assignment.service))
        })?;
        classified.push((&assignment.service, definition));
    }

    Ok(classified)
}

fn validate_mirror_kinds(
    current: &[(&ServiceRef, WorkloadDefinition)],
    direction: Direction,
) -> Result<()> {
    let required = direction.requires_current_mirror();
    let offending: Vec<String> = current
        .iter()
        .filter(|(_, definition)| definition.is_mirror != required)
        .map(|(service, definition)| format!("{service} ({definition})"))
        .collect();

    if offending.is_empty() {
        return Ok(());
    }

    let mixed = offending.len() < current.len();
    let expectation = if required {
        "every service to run a mirror definition"
    } else {
        "no service to run a mirror definition"
    };
    Err(SwapError::state_consistency(format!(
        "{direction} requires {expectation}; {}offending: {}",
        if mixed { "state is mixed, " } else { "" },
        offending.join(", ")
    )))
}

/// A standard definition carries its own cluster's color; a mirror
/// definition carries the opposite one.
fn validate_colors(current: &[(&ServiceRef, WorkloadDefinition)]) -> Result<()> {
    let offending: Vec<String> = current
        .iter()
        .filter(|(service, definition)| {
            let expected = if definition.is_mirror {
                service.color.opposite()
            } else {
                service.color
            };
            definition.color != expected
        })
        .map(|(service, definition)| {
            format!("{service} runs {} definition {definition}", definition.color)
        })
        .collect();

    if offending.is_empty() {
        Ok(())
    } else {
        Err(SwapError::state_consistency(format!(
            "definition colors disagree with their clusters: {}",
            offending.join(", ")
        )))
    }
}

fn classify_candidates(definitions: &[String]) -> Vec<WorkloadDefinition> {
    definitions
        .iter()
        .filter_map(|name| match classify_definition(name) {
            Ok(definition) => Some(definition),
            Err(error) => {
                tracing::debug!(definition = %name, %error, "skipping unclassifiable workload definition");
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Color;
    use crate::state::ServiceAssignment;

    fn service(name: &str, color: Color) -> ServiceRef {
        ServiceRef {
            cluster: color.as_str().to_string(),
            color,
            service: name.to_string(),
        }
    }

    fn assignment(name: &str, color: Color, definition: &str) -> ServiceAssignment {
        ServiceAssignment {
            service: service(name, color),
            definition: definition.to_string(),
        }
    }

    fn definitions(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|name| name.to_string()).collect()
    }

    fn full_standard_state() -> ServiceState {
        ServiceState::new(vec![
            assignment("PortalSvc", Color::Blue, "BluePortal:12"),
            assignment("IndexerSvc", Color::Blue, "BlueIndexer:4"),
            assignment("IngesterSvc", Color::Blue, "BlueIngester:2"),
            assignment("PortalSvc", Color::Green, "GreenPortal:7"),
            assignment("IndexerSvc", Color::Green, "GreenIndexer:3"),
            assignment("IngesterSvc", Color::Green, "GreenIngester:9"),
        ])
    }

    fn full_definition_list() -> Vec<String> {
        definitions(&[
            "BluePortal:12",
            "BlueIndexer:4",
            "BlueIngester:2",
            "GreenPortal:7",
            "GreenIndexer:3",
            "GreenIngester:9",
            "BlueMirrorPortal:3",
            "BlueMirrorIndexer:1",
            "BlueMirrorIngester:1",
            "GreenMirrorPortal:5",
            "GreenMirrorIndexer:2",
            "GreenMirrorIngester:8",
            "foursight-checks:40",
        ])
    }

    #[test]
    fn concrete_portal_scenario_targets_highest_opposite_mirror() {
        let state = ServiceState::new(vec![
            assignment("PortalSvc", Color::Blue, "BluePortal:12"),
            assignment("PortalSvc", Color::Green, "GreenPortal:7"),
        ]);
        let all = definitions(&[
            "BluePortal:12",
            "GreenPortal:7",
            "BlueMirrorPortal:3",
            "GreenMirrorPortal:5",
        ]);

        let plan = build_swap_plan(&state, &all, Direction::ToMirror).expect("plan should build");

        assert_eq!(plan.len(), 2);
        assert_eq!(
            plan.target_for(&service("PortalSvc", Color::Blue))
                .map(|target| target.name.as_str()),
            Some("GreenMirrorPortal:5")
        );
        assert_eq!(
            plan.target_for(&service("PortalSvc", Color::Green))
                .map(|target| target.name.as_str()),
            Some("BlueMirrorPortal:3")
        );
    }

    #[test]
    fn all_standard_state_plans_to_mirror_covering_every_service_once() {
        let state = full_standard_state();
        let plan = build_swap_plan(&state, &full_definition_list(), Direction::ToMirror)
            .expect("plan should build");

        assert_eq!(plan.len(), state.len());
        let covered: HashSet<&ServiceRef> = plan.steps.iter().map(|step| &step.service).collect();
        assert_eq!(covered.len(), state.len());

        for step in &plan.steps {
            assert!(step.target.is_mirror);
            assert_eq!(step.target.color, step.current.color.opposite());
            assert_eq!(step.target.service_type, step.current.service_type);
        }
    }

    #[test]
    fn all_standard_state_rejects_to_standard() {
        let error = build_swap_plan(
            &full_standard_state(),
            &full_definition_list(),
            Direction::ToStandard,
        )
        .expect_err("to_standard should fail");

        assert!(matches!(error, SwapError::StateConsistency(_)));
    }

    #[test]
    fn mixed_state_rejects_both_directions() {
        let state = ServiceState::new(vec![
            assignment("PortalSvc", Color::Blue, "GreenMirrorPortal:5"),
            assignment("PortalSvc", Color::Green, "GreenPortal:7"),
        ]);

        for direction in [Direction::ToMirror, Direction::ToStandard] {
            let error = build_swap_plan(&state, &full_definition_list(), direction)
                .expect_err("mixed state should fail");
            assert!(matches!(error, SwapError::StateConsistency(_)));
            assert!(error.to_string().contains("mixed"));
        }
    }

    #[test]
    fn revision_comparison_is_numeric() {
        let state = ServiceState::new(vec![assignment("PortalSvc", Color::Blue, "BluePortal:1")]);
        let all = definitions(&["GreenMirrorPortal:9", "GreenMirrorPortal:10", "GreenMirrorPortal:2"]);

        let plan = build_swap_plan(&state, &all, Direction::ToMirror).expect("plan should build");
        assert_eq!(plan.steps[0].target.name, "GreenMirrorPortal:10");
    }

    #[test]
    fn revision_ties_go_to_the_later_listed_candidate() {
        let state = ServiceState::new(vec![assignment("PortalSvc", Color::Blue, "BluePortal:1")]);
        let all = definitions(&["old-green-mirror-portal:5", "new-green-mirror-portal:5"]);

        let plan = build_swap_plan(&state, &all, Direction::ToMirror).expect("plan should build");
        assert_eq!(plan.steps[0].target.name, "new-green-mirror-portal:5");
    }

    #[test]
    fn missing_candidate_is_a_resolution_error() {
        let state = ServiceState::new(vec![assignment("IndexerSvc", Color::Blue, "BlueIndexer:1")]);
        let all = definitions(&["GreenMirrorPortal:5"]);

        let error = build_swap_plan(&state, &all, Direction::ToMirror).expect_err("no candidate");
        assert!(matches!(error, SwapError::Resolution(_)));
        assert!(error.to_string().contains("green mirror indexer"));
    }

    #[test]
    fn unclassifiable_current_definition_is_a_resolution_error() {
        let state = ServiceState::new(vec![assignment("Worker", Color::Blue, "BlueWorker:1")]);
        let error = build_swap_plan(&state, &full_definition_list(), Direction::ToMirror)
            .expect_err("unclassifiable should fail");
        assert!(matches!(error, SwapError::Resolution(_)));
    }

    #[test]
    fn definition_color_must_agree_with_cluster() {
        let state = ServiceState::new(vec![assignment("PortalSvc", Color::Blue, "GreenPortal:7")]);
        let error = build_swap_plan(&state, &full_definition_list(), Direction::ToMirror)
            .expect_err("color mismatch should fail");
        assert!(matches!(error, SwapError::StateConsistency(_)));
    }

    #[test]
    fn duplicate_service_is_rejected() {
        let state = ServiceState::new(vec![
            assignment("PortalSvc", Color::Blue, "BluePortal:12"),
            assignment("PortalSvc", Color::Blue, "BluePortal:12"),
        ]);
        let error = build_swap_plan(&state, &full_definition_list(), Direction::ToMirror)
            .expect_err("duplicate should fail");
        assert!(error.to_string().contains("more than once"));
    }

    #[test]
    fn empty_state_is_rejected() {
        let error = build_swap_plan(&ServiceState::default(), &full_definition_list(), Direction::ToMirror)
            .expect_err("empty state should fail");
        assert!(matches!(error, SwapError::Resolution(_)));
    }

    #[test]
    fn fingerprint_is_stable_and_sensitive_to_targets() {
        let state = full_standard_state();
        let plan_a = build_swap_plan(&state, &full_definition_list(), Direction::ToMirror).expect("a");
        let plan_b = build_swap_plan(&state, &full_definition_list(), Direction::ToMirror).expect("b");
        assert_eq!(plan_a.fingerprint(), plan_b.fingerprint());

        let mut changed = plan_a.clone();
        changed.steps[0].target.name = "GreenMirrorPortal:4".to_string();
        assert_ne!(plan_a.fingerprint(), changed.fingerprint());
    }

    #[test]
    fn render_lists_each_step() {
        let state = ServiceState::new(vec![assignment("PortalSvc", Color::Blue, "BluePortal:12")]);
        let plan = build_swap_plan(&state, &full_definition_list(), Direction::ToMirror).expect("plan");
        assert_eq!(
            plan.render(),
            "Swap plan (to_mirror, 1 updates):\n   1. PortalSvc@blue: BluePortal:12 -> GreenMirrorPortal:5"
        );
    }
}
