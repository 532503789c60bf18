//! Scanner configuration management.
//!
//! Configuration is read from environment variables with the `envy` crate,
//! after loading an optional `.env` file.

use std::time::Duration;

use serde::Deserialize;

/// Scanner configuration loaded from environment variables.
///
/// # Environment Variables
///
/// - `API_BASE_URL` (required): base URL of the marketplace backend
/// - `AUTH_TOKEN` (optional): stored bearer credential
/// - `CONFIRM_TIMEOUT_SECS` (optional): confirm request timeout, defaults to 10
/// - `EXPIRY_TICK_SECS` (optional): expiry reconciliation period, defaults to 60
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub api_base_url: String,

    #[serde(default)]
    pub auth_token: Option<String>,

    #[serde(default = "default_confirm_timeout")]
    pub confirm_timeout_secs: u64,

    #[serde(default = "default_expiry_tick")]
    pub expiry_tick_secs: u64,
}

fn default_confirm_timeout() -> u64 {
    10
}

fn default_expiry_tick() -> u64 {
    60
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is loaded first if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if `API_BASE_URL` is missing or a numeric variable
    /// does not parse.
    pub fn from_env() -> Result<Self, envy::Error> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>()
    }

    pub fn confirm_timeout(&self) -> Duration {
        Duration::from_secs(self.confirm_timeout_secs)
    }

    /// Expiry tick period, clamped to at least one second (tokio intervals cannot be zero).
    pub fn expiry_tick(&self) -> Duration {
        Duration::from_secs(self.expiry_tick_secs.max(1))
    }
}
