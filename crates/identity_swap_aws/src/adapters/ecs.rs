use aws_sdk_ecs::error::DisplayErrorContext;

use crate::adapters::platform::{OrchestrationPlatform, ServiceDescription};

/// DescribeServices accepts at most ten services per call.
const DESCRIBE_BATCH_SIZE: usize = 10;

pub struct EcsPlatform {
    ecs_client: aws_sdk_ecs::Client,
}

impl EcsPlatform {
    pub fn new(ecs_client: aws_sdk_ecs::Client) -> Self {
        Self { ecs_client }
    }
}

impl OrchestrationPlatform for EcsPlatform {
    fn list_clusters(&self) -> Result<Vec<String>, String> {
        let client = self.ecs_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let mut cluster_arns = Vec::new();
                let mut next_token = None;
                loop {
                    let output = client
                        .list_clusters()
                        .set_next_token(next_token)
                        .send()
                        .await
                        .map_err(|error| {
                            format!("failed to list ecs clusters: {}", DisplayErrorContext(&error))
                        })?;
                    cluster_arns.extend(output.cluster_arns().iter().cloned());
                    next_token = output.next_token().map(str::to_string);
                    if next_token.is_none() {
                        break;
                    }
                }
                Ok::<_, String>(cluster_arns)
            })
        })
    }

    fn list_services(&self, cluster: &str) -> Result<Vec<String>, String> {
        let client = self.ecs_client.clone();
        let cluster = cluster.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let mut service_arns = Vec::new();
                let mut next_token = None;
                loop {
                    let output = client
                        .list_services()
                        .cluster(cluster.clone())
                        .set_next_token(next_token)
                        .send()
                        .await
                        .map_err(|error| {
                            format!(
                                "failed to list services of {cluster}: {}",
                                DisplayErrorContext(&error)
                            )
                        })?;
                    service_arns.extend(output.service_arns().iter().cloned());
                    next_token = output.next_token().map(str::to_string);
                    if next_token.is_none() {
                        break;
                    }
                }
                Ok::<_, String>(service_arns)
            })
        })
    }

    fn describe_services(
        &self,
        cluster: &str,
        services: &[String],
    ) -> Result<Vec<ServiceDescription>, String> {
        let client = self.ecs_client.clone();
        let cluster = cluster.to_string();
        let batches: Vec<Vec<String>> = services
            .chunks(DESCRIBE_BATCH_SIZE)
            .map(<[String]>::to_vec)
            .collect();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let mut descriptions = Vec::new();
                for batch in batches {
                    let output = client
                        .describe_services()
                        .cluster(cluster.clone())
                        .set_services(Some(batch))
                        .send()
                        .await
                        .map_err(|error| {
                            format!(
                                "failed to describe services of {cluster}: {}",
                                DisplayErrorContext(&error)
                            )
                        })?;

                    if let Some(failure) = output.failures().first() {
                        return Err(format!(
                            "describe services on {cluster} reported {} for {}",
                            failure.reason().unwrap_or("an unknown failure"),
                            failure.arn().unwrap_or("an unnamed service")
                        ));
                    }

                    descriptions.extend(output.services().iter().map(|service| {
                        ServiceDescription {
                            service: service
                                .service_arn()
                                .or(service.service_name())
                                .unwrap_or_default()
                                .to_string(),
                            workload_definition: service.task_definition().map(str::to_string),
                        }
                    }));
                }
                Ok::<_, String>(descriptions)
            })
        })
    }

    fn list_workload_definitions(&self) -> Result<Vec<String>, String> {
        let client = self.ecs_client.clone();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                let mut definition_arns = Vec::new();
                let mut next_token = None;
                loop {
                    let output = client
                        .list_task_definitions()
                        .set_next_token(next_token)
                        .send()
                        .await
                        .map_err(|error| {
                            format!(
                                "failed to list task definitions: {}",
                                DisplayErrorContext(&error)
                            )
                        })?;
                    definition_arns.extend(output.task_definition_arns().iter().cloned());
                    next_token = output.next_token().map(str::to_string);
                    if next_token.is_none() {
                        break;
                    }
                }
                Ok::<_, String>(definition_arns)
            })
        })
    }

    fn update_service(
        &self,
        cluster: &str,
        service: &str,
        workload_definition: &str,
    ) -> Result<(), String> {
        let client = self.ecs_client.clone();
        let cluster = cluster.to_string();
        let service = service.to_string();
        let task_definition = workload_definition.to_string();

        tokio::task::block_in_place(|| {
            tokio::runtime::Handle::current().block_on(async move {
                client
                    .update_service()
                    .cluster(cluster)
                    .service(service)
                    .task_definition(task_definition)
                    .send()
                    .await
                    .map(|_| ())
                    .map_err(|error| {
                        format!("failed to update ecs service: {}", DisplayErrorContext(&error))
                    })
            })
        })
    }
}
