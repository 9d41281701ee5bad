//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use aj_core::stopwatch::DEFAULT_TITLE;
use aj_health::{ProviderKind, ProviderSettings};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the database file.
    pub database_path: PathBuf,

    /// Title given to routines recorded by the stopwatch.
    pub stopwatch_title: String,

    /// Which calorie provider to query.
    pub calorie_provider: ProviderKind,

    /// Base URL of the HTTP health bridge.
    pub calorie_base_url: Option<String>,

    /// Bearer token for the HTTP health bridge.
    pub calorie_token: Option<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("stopwatch_title", &self.stopwatch_title)
            .field("calorie_provider", &self.calorie_provider)
            .field("calorie_base_url", &self.calorie_base_url)
            .field(
                "calorie_token",
                &self.calorie_token.as_ref().map(|_| "[REDACTED]"),
            )
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("aj.db"),
            stopwatch_title: DEFAULT_TITLE.to_string(),
            calorie_provider: ProviderKind::None,
            calorie_base_url: None,
            calorie_token: None,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (AJ_*)
        figment = figment.merge(Env::prefixed("AJ_"));

        figment.extract()
    }

    /// Connection settings for the calorie provider.
    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            base_url: self.calorie_base_url.clone(),
            token: self.calorie_token.clone(),
        }
    }
}

/// Returns the platform-specific config directory for aj.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("aj"))
}

/// Returns the platform-specific data directory for aj.
///
/// On Linux: `~/.local/share/aj`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("aj"))
}
