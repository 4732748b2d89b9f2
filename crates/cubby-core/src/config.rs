//! Configuration module
//!
//! Environment-driven configuration consumed by the storage factory and the
//! session backend. All variables are optional; components that need a value
//! validate it when they are constructed.

use std::env;
use std::str::FromStr;

use crate::constants::DEFAULT_RETRIEVAL_URL_TTL_SECS;
use crate::error::ConfigError;
use crate::store_types::StoreBackend;

#[derive(Clone, Debug)]
pub struct Config {
    /// Which object store backend to construct (`STORE_BACKEND`).
    pub store_backend: Option<StoreBackend>,
    /// Root directory of the local backend (`LOCAL_STORE_PATH`).
    pub local_store_path: Option<String>,
    /// Base URL the local backend embeds in retrieval URLs (`LOCAL_STORE_BASE_URL`).
    pub local_store_base_url: Option<String>,
    /// Lifetime of issued retrieval URLs (`RETRIEVAL_URL_TTL_SECS`).
    pub retrieval_url_ttl_secs: u64,
    /// Path of the persisted session file (`SESSION_FILE`).
    pub session_file: Option<String>,
    /// Identity served by the dev auth backend (`DEV_IDENTITY_EMAIL`, `DEV_IDENTITY_NAME`).
    pub dev_identity_email: Option<String>,
    pub dev_identity_name: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let store_backend = match env::var("STORE_BACKEND") {
            Ok(raw) => Some(StoreBackend::from_str(&raw).map_err(|e| {
                ConfigError::InvalidValue {
                    var: "STORE_BACKEND",
                    message: e.to_string(),
                }
            })?),
            Err(_) => None,
        };

        let retrieval_url_ttl_secs = match env::var("RETRIEVAL_URL_TTL_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidValue {
                var: "RETRIEVAL_URL_TTL_SECS",
                message: e.to_string(),
            })?,
            Err(_) => DEFAULT_RETRIEVAL_URL_TTL_SECS,
        };

        Ok(Config {
            store_backend,
            local_store_path: env::var("LOCAL_STORE_PATH").ok(),
            local_store_base_url: env::var("LOCAL_STORE_BASE_URL").ok(),
            retrieval_url_ttl_secs,
            session_file: env::var("SESSION_FILE").ok(),
            dev_identity_email: env::var("DEV_IDENTITY_EMAIL").ok(),
            dev_identity_name: env::var("DEV_IDENTITY_NAME").ok(),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_backend: None,
            local_store_path: None,
            local_store_base_url: None,
            retrieval_url_ttl_secs: DEFAULT_RETRIEVAL_URL_TTL_SECS,
            session_file: None,
            dev_identity_email: None,
            dev_identity_name: None,
        }
    }
}
