use serde::{Deserialize, Serialize};

/// Whether `Require-Capability` should be derived from compiled output.
///
/// `Unset` means the option was not configured where the processor is
/// invoked; the caller's default then decides.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeriveHeaderOption {
    #[default]
    Unset,
    Enabled,
    Disabled,
}

impl DeriveHeaderOption {
    /// Resolve to a concrete decision, using `caller_default` for `Unset`.
    pub fn resolve(self, caller_default: bool) -> bool {
        match self {
            Self::Unset => caller_default,
            Self::Enabled => true,
            Self::Disabled => false,
        }
    }
}

impl From<Option<bool>> for DeriveHeaderOption {
    fn from(flag: Option<bool>) -> Self {
        match flag {
            None => Self::Unset,
            Some(true) => Self::Enabled,
            Some(false) => Self::Disabled,
        }
    }
}

/// Configuration for the manifest processor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessorConfig {
    /// The `deriveHeaderFromSource` option as configured by the caller.
    pub derive_header_from_source: DeriveHeaderOption,
    /// Decision used when the option is unset. Off by default: a processor
    /// invoked outside the packaging step derives nothing unless asked to.
    pub caller_default: bool,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            derive_header_from_source: DeriveHeaderOption::Unset,
            caller_default: false,
        }
    }
}

impl ProcessorConfig {
    /// The configuration used by the packaging step: derive unless
    /// explicitly disabled.
    pub fn packaging() -> Self {
        Self {
            caller_default: true,
            ..Default::default()
        }
    }

    /// Whether derivation runs under this configuration.
    pub fn derive_enabled(&self) -> bool {
        self.derive_header_from_source.resolve(self.caller_default)
    }
}
