use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub amadeus: AmadeusConfig,
    pub search: SearchSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AmadeusConfig {
    pub base_url: String,
    pub client_id: String,
    pub client_secret: String,
    #[serde(default = "default_refresh_margin")]
    pub token_refresh_margin_seconds: u64,
    #[serde(default = "default_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_refresh_margin() -> u64 { 60 }
fn default_timeout() -> u64 { 20 }

#[derive(Debug, Deserialize, Clone)]
pub struct SearchSettings {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_max_results")]
    pub max_results: u32,
    #[serde(default = "default_location_limit")]
    pub location_limit: u32,
}

fn default_currency() -> String { "USD".to_string() }
fn default_max_results() -> u32 { 50 }
fn default_location_limit() -> u32 { 10 }

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            currency: default_currency(),
            max_results: default_max_results(),
            location_limit: default_location_limit(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            // Per-environment overrides, optional
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Local overrides, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // FAREFINDER__AMADEUS__CLIENT_ID=... and friends
            .add_source(config::Environment::with_prefix("FAREFINDER").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
