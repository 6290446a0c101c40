use std::env;

use thiserror::Error;

use crate::gateway::Endpoints;
use crate::services::customers::MissingPhonePolicy;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),
    #[error("{name} has an invalid value `{value}`")]
    Invalid { name: &'static str, value: String },
}

/// Settings read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
    /// Cookie signing key for flash messages; a random one is used when unset.
    pub secret_key: Option<String>,
    pub endpoints: Endpoints,
    pub missing_phone_policy: MissingPhonePolicy,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|value| !value.trim().is_empty())
                .ok_or(ConfigError::Missing(name))
        };

        let orders_url = required("ORDERS_SCRIPT_URL")?;
        let delivery_notes_url = required("DELIVERY_NOTES_SCRIPT_URL")?;

        let port = match lookup("PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                name: "PORT",
                value,
            })?,
            None => 8080,
        };

        let missing_phone_policy = match lookup("MISSING_PHONE_POLICY") {
            Some(value) => value
                .parse::<MissingPhonePolicy>()
                .map_err(|_| ConfigError::Invalid {
                    name: "MISSING_PHONE_POLICY",
                    value,
                })?,
            None => MissingPhonePolicy::default(),
        };

        Ok(Self {
            address: lookup("ADDRESS").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            secret_key: lookup("SECRET_KEY").filter(|key| !key.is_empty()),
            endpoints: Endpoints::new(orders_url, delivery_notes_url),
            missing_phone_policy,
        })
    }
}
