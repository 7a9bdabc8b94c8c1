/// `load_config` module: reads the bot's YAML settings into a validated [`PickConfig`].
///
/// This is the only place where untrusted YAML is parsed. Unknown keys are
/// ignored, missing keys take their defaults, and the result is checked with
/// [`PickConfig::selection_policy`] so a bad `retries` or an empty extension
/// list is reported at startup rather than on the first request.
///
/// # Errors
/// All errors use `anyhow::Error` and are surfaced at the CLI boundary.
use anyhow::{Context, Result};
use reddit_pick_core::config::PickConfig;
use std::fs;
use std::path::Path;
use tracing::{error, info};

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PickConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    let config = parse_config(&config_content)
        .with_context(|| format!("Invalid config file {:?}", path_ref))?;
    config.trace_loaded();
    Ok(config)
}

/// Parse and validate a YAML document. An empty document yields the defaults.
pub fn parse_config(yaml: &str) -> Result<PickConfig> {
    let config: PickConfig = if yaml.trim().is_empty() {
        PickConfig::default()
    } else {
        match serde_yaml::from_str(yaml) {
            Ok(conf) => conf,
            Err(e) => {
                error!(error = ?e, "Failed to parse config YAML");
                return Err(anyhow::anyhow!("Failed to parse config YAML: {e}"));
            }
        }
    };

    if let Err(e) = config.selection_policy() {
        error!(error = %e, "Config failed validation");
        return Err(anyhow::Error::new(e));
    }
    Ok(config)
}
