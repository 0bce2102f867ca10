use std::path::PathBuf;

use clap::Parser;
use identity_swap_core::routing::DEFAULT_ROUTING_KEY;
use identity_swap_core::Direction;
use thiserror::Error;

use crate::handlers::swap::SwapRequest;

pub const ENV_BUCKET_VAR: &str = "GLOBAL_ENV_BUCKET";
/// Older deployments export the bucket under this name.
pub const FALLBACK_ENV_BUCKET_VAR: &str = "GLOBAL_BUCKET_ENV";

#[derive(Debug, Parser)]
#[command(
    name = "identity_swap",
    about = "Swap the production and standby identities of a blue/green cluster pair"
)]
pub struct Cli {
    /// Blue environment name (also used to find the blue cluster)
    pub blue: String,

    /// Green environment name (also used to find the green cluster)
    pub green: String,

    /// Swap to mirror workload definitions instead of back to standard ones
    #[arg(long)]
    pub mirror: bool,

    /// Also rewrite the retired per-environment routing documents
    #[arg(long)]
    pub do_legacy: bool,

    #[arg(long, env = ENV_BUCKET_VAR)]
    pub env_bucket: Option<String>,

    #[arg(long, env = "IDENTITY_SWAP_JOURNAL_DIR", default_value = ".identity-swap")]
    pub journal_dir: PathBuf,

    #[arg(long, env = "IDENTITY_SWAP_ROUTING_KEY", default_value = DEFAULT_ROUTING_KEY)]
    pub routing_key: String,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("no env bucket configured; pass --env-bucket or set GLOBAL_ENV_BUCKET")]
    MissingBucket,

    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapSettings {
    pub request: SwapRequest,
    pub env_bucket: String,
    pub journal_dir: PathBuf,
}

impl SwapSettings {
    /// `fallback_bucket` is consulted only when the CLI and
    /// `GLOBAL_ENV_BUCKET` leave the bucket unset.
    pub fn from_cli(cli: Cli, fallback_bucket: Option<String>) -> Result<Self, SettingsError> {
        let env_bucket = cli
            .env_bucket
            .filter(|bucket| !bucket.trim().is_empty())
            .or_else(|| fallback_bucket.filter(|bucket| !bucket.trim().is_empty()))
            .ok_or(SettingsError::MissingBucket)?;

        for (field, value) in [
            ("blue environment", &cli.blue),
            ("green environment", &cli.green),
            ("routing key", &cli.routing_key),
        ] {
            if value.trim().is_empty() {
                return Err(SettingsError::Empty { field });
            }
        }
        if cli.journal_dir.as_os_str().is_empty() {
            return Err(SettingsError::Empty {
                field: "journal directory",
            });
        }

        let request = SwapRequest {
            blue: cli.blue,
            green: cli.green,
            direction: Direction::from_mirror_flag(cli.mirror),
            do_legacy: cli.do_legacy,
            routing_key: cli.routing_key,
        };

        Ok(Self {
            request,
            env_bucket,
            journal_dir: cli.journal_dir,
        })
    }

    pub fn from_env(cli: Cli) -> Result<Self, SettingsError> {
        Self::from_cli(cli, std::env::var(FALLBACK_ENV_BUCKET_VAR).ok())
    }
}
