pub mod deploy;
pub mod inspect;
pub mod watch;

use anyhow::Context as _;
use stackflow_cloud::StackManager;
use stackflow_cloud_aws::{AwsConfig, CloudFormationApi};
use stackflow_config::{Settings, resolve_region};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Options every subcommand accepts
pub struct GlobalOptions {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub config: Option<PathBuf>,
}

/// Everything a subcommand needs to talk to CloudFormation
pub struct Context {
    pub manager: StackManager<CloudFormationApi>,
    pub settings: Settings,
}

impl Context {
    pub async fn connect(
        options: &GlobalOptions,
        cancel: CancellationToken,
    ) -> anyhow::Result<Self> {
        let settings = match &options.config {
            Some(path) => Settings::from_path(path)
                .with_context(|| format!("Failed to load settings from {}", path.display()))?,
            None => Settings::load()?,
        };

        let region = resolve_region(options.region.as_deref(), settings.region.as_deref())?;
        let mut aws = AwsConfig::new(&region);
        if let Some(profile) = options.profile.as_ref().or(settings.profile.as_ref()) {
            aws = aws.with_profile(profile);
        }
        tracing::info!("Using region {}", region);

        let api = CloudFormationApi::connect(&aws)
            .await
            .context("Failed to set up the CloudFormation client")?;
        let manager = StackManager::new(Arc::new(api))
            .with_tracker_config(settings.tracker_config())
            .with_cancellation(cancel);

        Ok(Self { manager, settings })
    }

    /// `--timeout` when given, the configured timeout otherwise
    pub fn timeout(&self, secs: Option<u64>) -> Duration {
        secs.map(Duration::from_secs)
            .unwrap_or_else(|| self.settings.timeout())
    }
}
