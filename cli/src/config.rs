//! Harness configuration: TOML file as base, flags and env override.

use serde::Deserialize;

/// Settings for driving a session against a backend.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct AdvisorConfig {
    /// Base URL of the advice backend.
    pub backend_url: String,
    /// Invisible-tier site key (parameterizes the loader script).
    pub invisible_site_key: String,
    /// Interactive-tier site key. Absent means the interactive tier is
    /// not provisioned and escalation surfaces a config error.
    pub interactive_site_key: Option<String>,
    /// Action tag invisible tokens are scoped to.
    pub action: String,
    /// Container the interactive widget renders into.
    pub container: String,
    /// Request timeout in seconds. Absent uses the dispatcher default.
    pub timeout_secs: Option<u64>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:8000".to_string(),
            invisible_site_key: "dev-invisible-key".to_string(),
            interactive_site_key: Some("dev-interactive-key".to_string()),
            action: "submit_advice".to_string(),
            container: "challenge-slot".to_string(),
            timeout_secs: None,
        }
    }
}

/// Flag and env-var overrides layered over the file (or default) base.
#[derive(Clone, Debug, Default, clap::Args)]
pub struct ConfigOverrides {
    /// Backend base URL.
    #[arg(long, env = "ADVISOR_BACKEND_URL")]
    pub backend_url: Option<String>,

    /// Invisible-tier site key.
    #[arg(long, env = "ADVISOR_INVISIBLE_SITE_KEY")]
    pub invisible_site_key: Option<String>,

    /// Interactive-tier site key.
    #[arg(long, env = "ADVISOR_INTERACTIVE_SITE_KEY")]
    pub interactive_site_key: Option<String>,

    /// Action tag invisible tokens are scoped to.
    #[arg(long, env = "ADVISOR_ACTION")]
    pub action: Option<String>,

    /// Container the interactive widget renders into.
    #[arg(long, env = "ADVISOR_CONTAINER")]
    pub container: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, env = "ADVISOR_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,
}

impl AdvisorConfig {
    /// Layer flag/env overrides over this base. Set overrides win;
    /// absent ones keep the base value.
    pub fn merge(mut self, overrides: ConfigOverrides) -> Self {
        if let Some(url) = overrides.backend_url {
            self.backend_url = url;
        }
        if let Some(key) = overrides.invisible_site_key {
            self.invisible_site_key = key;
        }
        if let Some(key) = overrides.interactive_site_key {
            self.interactive_site_key = Some(key);
        }
        if let Some(action) = overrides.action {
            self.action = action;
        }
        if let Some(container) = overrides.container {
            self.container = container;
        }
        if let Some(secs) = overrides.timeout_secs {
            self.timeout_secs = Some(secs);
        }
        self
    }

    /// Load from a TOML file, falling back to defaults on any failure.
    pub fn load(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<AdvisorConfig>(&contents) {
                Ok(config) => {
                    tracing::info!("Loaded config from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file: {e}, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!(
                    "Failed to read config file {}: {e}, using defaults",
                    path.display()
                );
                Self::default()
            }
        }
    }
}
