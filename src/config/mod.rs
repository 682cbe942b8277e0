// ABOUTME: Configuration types and parsing for revwatch.yml.
// ABOUTME: Handles YAML parsing, discovery, defaults, and CLI overrides.

mod init;

pub use init::init_config;

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "revwatch.yml";
pub const CONFIG_FILENAME_ALT: &str = "revwatch.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".revwatch/config.yml";

/// Platform whose revisions expose status conditions.
pub const SELF_MANAGED_PLATFORM: &str = "gke";

/// Settings for one monitoring invocation.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WaitConfig {
    /// Delay before each status poll.
    #[serde(default = "default_interval", with = "humantime_serde")]
    pub interval: Duration,

    /// Overall deadline for the revision to become ready.
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Value of `--platform=` that allows waiting.
    #[serde(default = "default_platform")]
    pub platform: String,

    /// Service (configuration) name the deploy targeted.
    #[serde(default)]
    pub namespace: Option<String>,

    /// Cluster used for the latest-revision lookup.
    #[serde(default)]
    pub cluster: Option<String>,
}

fn default_interval() -> Duration {
    Duration::from_secs(10)
}

fn default_timeout() -> Duration {
    Duration::from_secs(300)
}

fn default_platform() -> String {
    SELF_MANAGED_PLATFORM.to_string()
}

impl Default for WaitConfig {
    fn default() -> Self {
        WaitConfig {
            interval: default_interval(),
            timeout: default_timeout(),
            platform: default_platform(),
            namespace: None,
            cluster: None,
        }
    }
}

impl WaitConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: WaitConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Discover a config file, falling back to defaults when there is none.
    pub fn discover_or_default(dir: &Path) -> Result<Self> {
        match Self::discover(dir) {
            Err(Error::ConfigNotFound(_)) => Ok(Self::default()),
            other => other,
        }
    }

    /// The `--platform=` argument that must be present to wait.
    pub fn platform_flag(&self) -> String {
        format!("--platform={}", self.platform)
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval.is_zero() {
            return Err(Error::InvalidConfig(
                "interval must be greater than zero".to_string(),
            ));
        }
        if self.platform.trim().is_empty() {
            return Err(Error::InvalidConfig("platform cannot be empty".to_string()));
        }
        Ok(())
    }
}
