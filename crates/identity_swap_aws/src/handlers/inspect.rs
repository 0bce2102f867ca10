use identity_swap_core::{ClusterPair, Result, ServiceAssignment, ServiceRef, ServiceState, SwapError};

use crate::adapters::platform::OrchestrationPlatform;

/// Reads every service of both clusters, blue first, into one mapping.
///
/// Both clusters must run at least one service; a swap against an empty side
/// would re-point production at a cluster that serves nothing.
pub fn inspect_service_state(
    platform: &impl OrchestrationPlatform,
    clusters: &ClusterPair,
) -> Result<ServiceState> {
    let mut assignments = Vec::new();

    for cluster in clusters.iter() {
        let services = platform.list_services(&cluster.id).map_err(|error| {
            SwapError::resolution(format!("cannot list services of {cluster}: {error}"))
        })?;
        if services.is_empty() {
            return Err(SwapError::resolution(format!(
                "{} cluster {cluster} has no services; both clusters of the pair must be populated",
                cluster.color
            )));
        }

        let descriptions = platform
            .describe_services(&cluster.id, &services)
            .map_err(|error| {
                SwapError::resolution(format!("cannot describe services of {cluster}: {error}"))
            })?;

        for service in &services {
            let description = descriptions
                .iter()
                .find(|description| &description.service == service)
                .ok_or_else(|| {
                    SwapError::resolution(format!(
                        "service {service} on {cluster} was not described by the platform"
                    ))
                })?;
            let definition = description.workload_definition.clone().ok_or_else(|| {
                SwapError::resolution(format!(
                    "service {service} on {cluster} has no workload definition assigned"
                ))
            })?;

            assignments.push(ServiceAssignment {
                service: ServiceRef {
                    cluster: cluster.id.clone(),
                    color: cluster.color,
                    service: service.clone(),
                },
                definition,
            });
        }

        tracing::info!(cluster = %cluster, services = services.len(), "inspected cluster");
    }

    Ok(ServiceState::new(assignments))
}

#[cfg(test)]
mod tests {
    use identity_swap_core::{Cluster, Color};

    use super::*;
    use crate::test_helpers::InMemoryPlatform;

    fn clusters() -> ClusterPair {
        ClusterPair {
            blue: Cluster {
                id: "blue".to_string(),
                color: Color::Blue,
            },
            green: Cluster {
                id: "green".to_string(),
                color: Color::Green,
            },
        }
    }

    #[test]
    fn merges_both_clusters_blue_first() {
        let platform = InMemoryPlatform::new()
            .with_service("green", "PortalSvc", "GreenPortal:7")
            .with_service("blue", "PortalSvc", "BluePortal:12")
            .with_service("blue", "IndexerSvc", "BlueIndexer:4");

        let state = inspect_service_state(&platform, &clusters()).expect("inspect");

        let rendered: Vec<String> = state
            .assignments
            .iter()
            .map(|assignment| format!("{}={}", assignment.service, assignment.definition))
            .collect();
        assert_eq!(
            rendered,
            vec![
                "PortalSvc@blue=BluePortal:12",
                "IndexerSvc@blue=BlueIndexer:4",
                "PortalSvc@green=GreenPortal:7",
            ]
        );
        assert_eq!(state.assignments[2].service.color, Color::Green);
    }

    #[test]
    fn describe_failure_is_a_resolution_error() {
        let platform = InMemoryPlatform::new()
            .with_service("blue", "PortalSvc", "BluePortal:12")
            .with_service("green", "PortalSvc", "GreenPortal:7")
            .failing_describe("green");

        let error = inspect_service_state(&platform, &clusters()).expect_err("describe fails");
        assert!(matches!(error, SwapError::Resolution(_)));
        assert!(error.to_string().contains("cannot describe services of green"));
    }

    #[test]
    fn empty_cluster_is_a_resolution_error() {
        let platform = InMemoryPlatform::new()
            .with_service("blue", "PortalSvc", "BluePortal:12")
            .with_cluster("green");

        let error = inspect_service_state(&platform, &clusters()).expect_err("green is empty");
        assert!(matches!(error, SwapError::Resolution(_)));
        assert!(error.to_string().contains("green cluster green has no services"));
    }

    #[test]
    fn service_without_definition_is_a_resolution_error() {
        let platform = InMemoryPlatform::new().with_unassigned_service("blue", "PortalSvc");

        let error = inspect_service_state(&platform, &clusters()).expect_err("no definition");
        assert!(error.to_string().contains("no workload definition"));
    }
}
