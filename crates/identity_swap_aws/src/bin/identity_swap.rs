use std::process::ExitCode;

use clap::Parser;
use identity_swap_aws::adapters::ecs::EcsPlatform;
use identity_swap_aws::adapters::journal_store::FileJournalStore;
use identity_swap_aws::adapters::operator::TerminalOperator;
use identity_swap_aws::adapters::s3::S3ObjectStore;
use identity_swap_aws::handlers::swap::{run_identity_swap, SwapOutcome};
use identity_swap_aws::settings::{Cli, SwapSettings};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let settings = match SwapSettings::from_env(Cli::parse()) {
        Ok(settings) => settings,
        Err(error) => {
            tracing::error!(%error, "invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
    let platform = EcsPlatform::new(aws_sdk_ecs::Client::new(&config));
    let store = S3ObjectStore::new(settings.env_bucket.clone(), aws_sdk_s3::Client::new(&config));
    let journals = FileJournalStore::new(settings.journal_dir.clone());
    let mut operator = TerminalOperator::stdio();

    match run_identity_swap(&settings.request, &platform, &store, &journals, &mut operator) {
        Ok(SwapOutcome::Completed { plan_steps, .. }) => {
            tracing::info!(plan_steps, "identity swap finished");
            ExitCode::SUCCESS
        }
        Ok(SwapOutcome::Declined(checkpoint)) => {
            tracing::info!(?checkpoint, "operator declined; exiting without further changes");
            ExitCode::SUCCESS
        }
        Err(error) => {
            tracing::error!(%error, "identity swap failed");
            ExitCode::FAILURE
        }
    }
}
