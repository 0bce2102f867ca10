#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescription {
    pub service: String,
    pub workload_definition: Option<String>,
}

/// Container-orchestration calls a swap needs. Every call blocks.
pub trait OrchestrationPlatform {
    fn list_clusters(&self) -> Result<Vec<String>, String>;

    fn list_services(&self, cluster: &str) -> Result<Vec<String>, String>;

    fn describe_services(
        &self,
        cluster: &str,
        services: &[String],
    ) -> Result<Vec<ServiceDescription>, String>;

    fn list_workload_definitions(&self) -> Result<Vec<String>, String>;

    /// Requests a rollout; returns once the platform accepts it.
    fn update_service(
        &self,
        cluster: &str,
        service: &str,
        workload_definition: &str,
    ) -> Result<(), String>;
}
