use std::path::Path;

use anyhow::Context;
use reqcap_derive::ProcessorConfig;
use serde::{Deserialize, Serialize};

/// Contents of the `--config` file.
///
/// ```toml
/// [derive]
/// derive_header_from_source = "enabled"
/// caller_default = true
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub derive: ProcessorConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        // The CLI acts as the packaging step: derive unless disabled.
        Self {
            derive: ProcessorConfig::packaging(),
        }
    }
}

impl CliConfig {
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        toml::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }
}
