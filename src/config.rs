use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{JikanCatalog, DEFAULT_CATALOG_BASE_URL};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid {key} value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub port: u16,
    /// Unset means the in-memory store
    pub database_url: Option<String>,
    /// Unset means the bundled quiz corpus
    pub quiz_bank_path: Option<PathBuf>,
    pub catalog_base_url: String,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            port: try_load(var("PORT"), "PORT", "3000")?,
            database_url: var("DATABASE_URL"),
            quiz_bank_path: var("QUIZ_BANK_PATH").map(PathBuf::from),
            catalog_base_url: var("CATALOG_BASE_URL").unwrap_or_else(|| {
                info!("CATALOG_BASE_URL not set, using default: {DEFAULT_CATALOG_BASE_URL}");
                DEFAULT_CATALOG_BASE_URL.to_string()
            }),
        })
    }

    /// Catalog client pointed at the configured base URL
    pub fn catalog(&self) -> Result<JikanCatalog, reqwest::Error> {
        JikanCatalog::new(self.catalog_base_url.as_str())
    }
}

fn try_load<T: FromStr>(
    value: Option<String>,
    key: &'static str,
    default: &str,
) -> Result<T, ConfigError>
where
    T::Err: Display,
{
    let value = value.unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    let parsed = value.trim().parse::<T>();
    parsed.map_err(|e| {
        warn!("Invalid {key} value: {e}");
        ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }
    })
}
