use crate::domain_model::SecretKey;
use anyhow::{Result, anyhow, bail};
use config::{Config, ConfigBuilder, Environment, File, builder::DefaultState};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub auth: Auth,
    pub store: Store,
    pub http: Http,
    pub log: Log,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub access_secret: SecretKey,
    pub refresh_secret: SecretKey,
    #[serde(default = "default_access_ttl_secs")]
    pub access_ttl_secs: u64,
    /// Absent means refresh tokens never expire.
    #[serde(default)]
    pub refresh_ttl_secs: Option<u64>,
    #[serde(default)]
    pub rotate_refresh_tokens: bool,
}

impl Auth {
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_ttl_secs)
    }

    pub fn refresh_ttl(&self) -> Option<Duration> {
        self.refresh_ttl_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct Store {
    pub backend: String, // "memory" or "redis"
    #[serde(default)]
    pub redis_url: Option<String>,
    #[serde(default = "default_store_prefix")]
    pub prefix: String,
    /// How often the memory backend drops expired entries.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Store {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    #[serde(default)]
    pub cert_path: Option<String>,
    #[serde(default)]
    pub key_path: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

fn default_access_ttl_secs() -> u64 {
    15
}

fn default_store_prefix() -> String {
    "refresh".to_string()
}

fn default_sweep_interval_secs() -> u64 {
    60
}

/// Upper bound for token lifetimes; keeps `exp` inside the JWT and chrono ranges.
pub const MAX_TTL_SECS: u64 = 100 * 365 * 24 * 60 * 60;

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub const ENV_PREFIX: &str = "TOKENGATE";

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.auth.access_secret.is_empty() {
            bail!("auth.access_secret must be set");
        }
        if self.auth.refresh_secret.is_empty() {
            bail!("auth.refresh_secret must be set");
        }
        if self.auth.access_secret == self.auth.refresh_secret {
            bail!("auth.access_secret and auth.refresh_secret must differ");
        }
        if !(1..=MAX_TTL_SECS).contains(&self.auth.access_ttl_secs) {
            bail!("auth.access_ttl_secs must be between 1 and {}", MAX_TTL_SECS);
        }
        if let Some(ttl) = self.auth.refresh_ttl_secs {
            if !(1..=MAX_TTL_SECS).contains(&ttl) {
                bail!("auth.refresh_ttl_secs must be between 1 and {}", MAX_TTL_SECS);
            }
        }
        if self.store.sweep_interval_secs == 0 {
            bail!("store.sweep_interval_secs must be positive");
        }
        match self.store.backend.as_str() {
            "memory" => {}
            "redis" if self.store.redis_url.is_some() => {}
            "redis" => bail!("store.redis_url is required for the redis backend"),
            other => bail!("Unknown store backend: {}", other),
        }
        if self.http.cert_path.is_some() != self.http.key_path.is_some() {
            bail!("http.cert_path and http.key_path must be set together");
        }
        Ok(())
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
}

pub(crate) fn build_settings(builder: ConfigBuilder<DefaultState>) -> Result<Settings> {
    let settings: Settings = builder
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    settings.validate()?;
    Ok(settings)
}

/// Loads settings from a TOML file, then applies `TOKENGATE__SECTION__KEY`
/// environment overrides. Secrets are expected to come from the environment.
pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    build_settings(
        Config::builder()
            .add_source(File::with_name(path))
            .add_source(environment()),
    )
}
