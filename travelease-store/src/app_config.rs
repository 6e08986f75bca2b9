use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub storage: StorageConfig,
    pub checkout: CheckoutConfig,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    File,
    Redis,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
    pub redis_url: Option<String>,
    pub session_key: String,
    pub cart_key: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CheckoutConfig {
    pub tax_rate: f64,
    pub currency: String,
    pub payment_delay_ms: u64,
}

impl CheckoutConfig {
    pub fn payment_delay(&self) -> Duration {
        Duration::from_millis(self.payment_delay_ms)
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Self::defaults()?
            // Shared settings, optional so the binary runs from any directory
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            // Developer overrides, never checked in
            .add_source(config::File::with_name("config/local").required(false))
            // Eg. `TRAVELEASE__STORAGE__BACKEND=redis`
            .add_source(config::Environment::with_prefix("TRAVELEASE").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("storage.backend", "file")?
            .set_default("storage.data_dir", ".travelease")?
            .set_default("storage.session_key", "travelease_user")?
            .set_default("storage.cart_key", "travelease_cart")?
            .set_default("checkout.tax_rate", 0.1)?
            .set_default("checkout.currency", "INR")?
            .set_default("checkout.payment_delay_ms", 3000_i64)
    }
}
