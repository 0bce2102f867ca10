#![allow(dead_code)]

use identity_swap_aws::test_helpers::{InMemoryObjectStore, InMemoryPlatform, ScriptedOperator};
use serde_json::json;

pub const BLUE_ENV: &str = "acme-blue";
pub const GREEN_ENV: &str = "acme-green";
pub const BLUE_CLUSTER: &str = "arn:aws:ecs:us-east-1:123456789012:cluster/acme-blue";
pub const GREEN_CLUSTER: &str = "arn:aws:ecs:us-east-1:123456789012:cluster/acme-green";
pub const ROUTING_KEY: &str = "main.ecosystem";

/// The two-portal pair from the operator runbook.
pub fn portal_pair_platform() -> InMemoryPlatform {
    InMemoryPlatform::new()
        .with_service(BLUE_CLUSTER, "PortalSvc", "BluePortal:12")
        .with_service(GREEN_CLUSTER, "PortalSvc", "GreenPortal:7")
        .with_definitions(&["BlueMirrorPortal:3", "GreenMirrorPortal:5"])
}

/// Portal, indexer and ingester on both colors, with older revisions and
/// unrelated definitions in the account.
pub fn full_stack_platform() -> InMemoryPlatform {
    InMemoryPlatform::new()
        .with_cluster("arn:aws:ecs:us-east-1:123456789012:cluster/shared-tools")
        .with_service(BLUE_CLUSTER, "PortalSvc", "BluePortal:12")
        .with_service(BLUE_CLUSTER, "IndexerSvc", "BlueIndexer:4")
        .with_service(BLUE_CLUSTER, "IngesterSvc", "BlueIngester:9")
        .with_service(GREEN_CLUSTER, "PortalSvc", "GreenPortal:7")
        .with_service(GREEN_CLUSTER, "IndexerSvc", "GreenIndexer:3")
        .with_service(GREEN_CLUSTER, "IngesterSvc", "GreenIngester:10")
        .with_definitions(&[
            "BluePortal:9",
            "BluePortal:11",
            "BlueMirrorPortal:2",
            "BlueMirrorPortal:3",
            "GreenMirrorPortal:5",
            "BlueMirrorIndexer:1",
            "GreenMirrorIndexer:2",
            "BlueMirrorIngester:9",
            "BlueMirrorIngester:10",
            "GreenMirrorIngester:4",
            "datadog-agent:3",
        ])
}

pub fn routing_store() -> InMemoryObjectStore {
    let blue = json!({"prd_env_name": BLUE_ENV, "stg_env_name": GREEN_ENV});
    InMemoryObjectStore::new()
        .with_json(ROUTING_KEY, &blue)
        .with_json("blue.ecosystem", &blue)
        .with_json(
            "green.ecosystem",
            &json!({"prd_env_name": GREEN_ENV, "stg_env_name": BLUE_ENV}),
        )
}

pub fn legacy_routing_store() -> InMemoryObjectStore {
    routing_store()
        .with_json(
            BLUE_ENV,
            &json!({"portal_url": "https://blue.acme.org", "es_url": "https://es.blue.acme.org:443", "env_name": BLUE_ENV}),
        )
        .with_json(
            GREEN_ENV,
            &json!({"portal_url": "https://green.acme.org", "es_url": "https://es.green.acme.org:443", "env_name": GREEN_ENV}),
        )
        .with_json("data", &json!({"fourfront": "https://blue.acme.org", "ff_env": BLUE_ENV}))
        .with_json("staging", &json!({"fourfront": "https://green.acme.org", "ff_env": GREEN_ENV}))
}

/// Accepts state, plan and every routing document.
pub fn approving_operator(prompts: usize) -> ScriptedOperator {
    ScriptedOperator::new(&vec![true; prompts])
}

pub fn assignment_snapshot(platform: &InMemoryPlatform) -> Vec<(String, String, Option<String>)> {
    platform
        .assignments()
        .into_iter()
        .filter(|(cluster, _, _)| cluster == BLUE_CLUSTER || cluster == GREEN_CLUSTER)
        .collect()
}
