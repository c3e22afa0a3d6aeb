use block_escape_system_engagement::Config as EngagementConfig;
use serde::Deserialize;

use crate::ManagerError;

/// What `GameManager::load_level` does with level data that fails validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Load the registry's first level instead.
    #[default]
    DefaultLevel,
    /// Keep the level currently being played.
    KeepCurrent,
}

/// Settings for [`crate::GameManager`], usually read from a TOML file.
///
/// Engagement limits are in milliseconds. Missing keys keep their defaults
/// and a limit of `0` switches that timer off.
///
/// ```toml
/// start_input_disabled = true
/// fallback = "keep_current"
/// guided = false
///
/// [engagement]
/// idle_timeout_ms = 30000
/// max_engagement_ms = 180000
/// input_failsafe_ms = 0
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ManagerConfig {
    /// Engagement timer limits.
    pub engagement: EngagementConfig,
    /// Whether input starts disabled until the host enables it.
    pub start_input_disabled: bool,
    /// Behaviour on invalid level data.
    pub fallback: FallbackPolicy,
    /// Whether guided mode starts enabled.
    pub guided: bool,
}

impl ManagerConfig {
    /// Parses a TOML configuration document.
    pub fn from_toml_str(source: &str) -> Result<Self, ManagerError> {
        Ok(toml::from_str(source)?)
    }
}
