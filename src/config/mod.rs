mod basic;
mod client;
mod job;

pub use basic::BasicConfig;
pub use client::{ClientConfig, ClientResolvedConfig};
pub use job::{JobConfig, JobResolvedConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration managed by Figment.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    /// Logging, cookie and debug-artifact settings (see `basic` table in config.toml).
    #[serde(default)]
    pub basic: BasicConfig,

    /// HTTP client, rate-limit and retry settings (see `client` table in config.toml).
    #[serde(default)]
    pub client: ClientConfig,

    /// Motion job parameters and polling cadence (see `job` table in config.toml).
    #[serde(default)]
    pub job: JobConfig,
}

const DEFAULT_CONFIG_FILE: &str = "config.toml";
const ENV_PREFIX: &str = "LEONAI_";

impl Config {
    /// Builds a Figment that merges defaults, `config.toml` if present, and `LEONAI_*`
    /// environment variables (`__` separates nested keys, e.g. `LEONAI_CLIENT__WAIT_MS`).
    pub fn figment() -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if PathBuf::from(DEFAULT_CONFIG_FILE).is_file() {
            figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
        }
        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Loads configuration by merging defaults, `config.toml` and the environment.
    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn client(&self) -> ClientResolvedConfig {
        self.client.resolve()
    }

    pub fn job(&self) -> JobResolvedConfig {
        self.job.resolve()
    }
}
