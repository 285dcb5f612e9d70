use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

pub const DEFAULT_URL: &str =
    "https://brain.com.ua/ukr/Mobilniy_telefon_Apple_iPhone_16_Pro_Max_256GB_Black_Titanium-p1145443.html";

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/142.0.0.0 Safari/537.36";

const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_DB_PATH: &str = "data/gadgets.sqlite";

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub db_path: String,
}

impl Settings {
    /// Defaults overlaid with `GADGET_*` environment variables
    /// (`GADGET_URL`, `GADGET_USER_AGENT`, `GADGET_TIMEOUT_SECS`, `GADGET_DB_PATH`).
    pub fn load() -> Result<Self> {
        Self::from_env(Environment::with_prefix("GADGET").try_parsing(true))
    }

    fn from_env(env: Environment) -> Result<Self> {
        Config::builder()
            .set_default("url", DEFAULT_URL)?
            .set_default("user_agent", DEFAULT_USER_AGENT)?
            .set_default("timeout_secs", DEFAULT_TIMEOUT_SECS)?
            .set_default("db_path", DEFAULT_DB_PATH)?
            .add_source(env)
            .build()
            .context("Failed to build settings")?
            .try_deserialize()
            .context("Invalid GADGET_* settings")
    }
}
