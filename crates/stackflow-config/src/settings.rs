//! Settings file contents

use crate::error::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use stackflow_cloud::TrackerConfig;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_TIMEOUT_SECS: u64 = 1800;

/// `stackflow.yaml`
///
/// ```yaml
/// region: us-west-2
/// profile: ops
/// timeout_secs: 900
/// poll_interval_secs: 5
/// lookback_secs: 2
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub region: Option<String>,
    pub profile: Option<String>,
    pub timeout_secs: u64,
    pub poll_interval_secs: u64,
    pub lookback_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let tracker = TrackerConfig::default();
        Self {
            region: None,
            profile: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            poll_interval_secs: tracker.poll_interval.as_secs(),
            lookback_secs: tracker.lookback.as_secs(),
        }
    }
}

impl Settings {
    /// Parse settings from YAML. An empty document yields the defaults.
    pub fn from_yaml(content: &str, path: &Path) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let settings: Settings =
            serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content, path)
    }

    /// Load the first settings file found, or the defaults when there is none
    pub fn load() -> Result<Self> {
        match crate::find_config_file()? {
            Some(path) => {
                tracing::debug!("Loading settings from {}", path.display());
                Self::from_path(&path)
            }
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "timeout_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "poll_interval_secs",
                message: "must be greater than zero".to_string(),
            });
        }
        if let Some(region) = &self.region
            && !crate::region::is_known_region(region)
        {
            return Err(ConfigError::UnknownRegion(region.clone()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            poll_interval: Duration::from_secs(self.poll_interval_secs),
            lookback: Duration::from_secs(self.lookback_secs),
        }
    }
}
