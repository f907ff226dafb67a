//! StudyPulse configuration loaded from file and environment.
//!
//! Precedence: env `PULSE_CONFIG` path > `config/pulse.toml` > defaults, with
//! `PULSE`-prefixed environment variables overriding file values. Change
//! polling cadence and endpoints without code edits.
//!
//! | Env | Default | Description |
//! |-----|---------|--------------|
//! | PULSE__API_BASE_URL | http://localhost:8000 | Dashboard API base. |
//! | PULSE__API_TOKEN | (none) | Bearer token for the auth context. |
//! | PULSE__STORAGE_PATH | ./data | Base directory for the Sled store. |
//! | PULSE__POLL_INTERVAL_SECS | 60 | Energy poll tick cadence. |

use serde::{Deserialize, Serialize};
use std::path::Path;

fn default_poll_interval() -> u64 {
    60
}

fn default_refetch_delay() -> u64 {
    3
}

fn default_reward_minutes() -> u32 {
    30
}

/// Runtime configuration for the gamification engine and its daemon host.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PulseConfig {
    /// Application identity used in logs.
    pub app_name: String,
    /// Dashboard API base URL (no trailing slash required).
    pub api_base_url: String,
    /// Bearer token for the dashboard API; `None` for unauthenticated dev runs.
    #[serde(default)]
    pub api_token: Option<String>,
    /// Base directory for the Sled progress store.
    pub storage_path: String,
    /// Energy poll cadence in seconds. Clamped to at least 10 by the daemon.
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    /// Delay before the authoritative re-fetch after an optimistic
    /// classification delta.
    #[serde(default = "default_refetch_delay")]
    pub classification_refetch_delay_secs: u64,
    /// Reward-mode duration when the caller does not supply one.
    #[serde(default = "default_reward_minutes")]
    pub reward_mode_default_minutes: u32,
}

impl PulseConfig {
    /// Load config from file and environment. Precedence: env `PULSE_CONFIG`
    /// path > `config/pulse` > defaults; `PULSE`-prefixed env vars win.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("PULSE_CONFIG").unwrap_or_else(|_| "config/pulse".to_string());
        let builder = config::Config::builder()
            .set_default("app_name", "StudyPulse")?
            .set_default("api_base_url", "http://localhost:8000")?
            .set_default("storage_path", "./data")?
            .set_default("poll_interval_secs", 60_i64)?
            .set_default("classification_refetch_delay_secs", 3_i64)?
            .set_default("reward_mode_default_minutes", 30_i64)?;

        let path = Path::new(&config_path);
        let builder = if path.exists() {
            builder.add_source(config::File::from(path))
        } else {
            builder
        };

        let built = builder
            .add_source(config::Environment::with_prefix("PULSE").separator("__"))
            .build()?;

        built.try_deserialize()
    }
}
