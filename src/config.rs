//! Environment-driven application configuration.

use std::net::SocketAddr;

use thiserror::Error;

use crate::records::RestBaseConfig;
use crate::storage::S3Config;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub listen_addr: SocketAddr,
    pub records: RestBaseConfig,
    pub storage: S3Config,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let listen_addr = optional("HACKBASE_LISTEN_ADDR")
            .unwrap_or_else(|| "127.0.0.1:8080".to_string());
        let listen_addr: SocketAddr =
            listen_addr
                .parse()
                .map_err(|_| ConfigError::Invalid {
                    name: "HACKBASE_LISTEN_ADDR",
                    value: listen_addr.clone(),
                })?;

        let records = RestBaseConfig::new(
            optional("HACKBASE_RECORDS_API_URL")
                .unwrap_or_else(|| "https://api.airtable.com/v0".to_string()),
            required("HACKBASE_RECORDS_API_KEY")?,
            required("HACKBASE_RECORDS_BASE_ID")?,
        );

        // The production deployment runs against an S3-compatible provider
        // behind a custom endpoint; the defaults match it.
        let endpoint = optional("HACKBASE_S3_ENDPOINT")
            .unwrap_or_else(|| "https://storage.yandexcloud.net".to_string());
        let public_host = optional("HACKBASE_S3_PUBLIC_HOST").unwrap_or_else(|| {
            endpoint
                .trim_start_matches("https://")
                .trim_start_matches("http://")
                .to_string()
        });
        let storage = S3Config {
            bucket: required("HACKBASE_S3_BUCKET")?,
            region: optional("HACKBASE_S3_REGION").unwrap_or_else(|| "ru-central1".to_string()),
            endpoint,
            public_host,
            access_key: required("HACKBASE_S3_ACCESS_KEY")?,
            secret_key: required("HACKBASE_S3_SECRET_KEY")?,
        };

        Ok(Self {
            listen_addr,
            records,
            storage,
        })
    }
}

fn optional(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    optional(name).ok_or(ConfigError::Missing(name))
}
