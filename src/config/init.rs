// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates revwatch.yml template files.

use humantime_serde::re::humantime::format_duration;
use std::path::Path;

use super::{CONFIG_FILENAME, WaitConfig};
use crate::error::{Error, Result};

/// Write a `revwatch.yml` template into `dir`.
pub fn init_config(dir: &Path, namespace: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let config = WaitConfig {
        namespace: namespace.map(str::to_string),
        ..WaitConfig::default()
    };

    std::fs::write(&config_path, generate_template_yaml(&config))?;
    Ok(())
}

fn generate_template_yaml(config: &WaitConfig) -> String {
    format!(
        r#"interval: {}
timeout: {}
platform: {}
namespace: {}
# cluster: my-cluster
"#,
        format_duration(config.interval),
        format_duration(config.timeout),
        config.platform,
        config.namespace.as_deref().unwrap_or("my-service"),
    )
}
