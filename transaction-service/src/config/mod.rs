use anyhow::{Context, Result};
use dotenvy::dotenv;
use secrecy::Secret;
use serde::Deserialize;
use std::env;
use std::time::Duration;

const TRIPAY_SANDBOX_URL: &str = "https://tripay.co.id/api-sandbox";
const TRIPAY_PRODUCTION_URL: &str = "https://tripay.co.id/api";

#[derive(Deserialize, Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub tripay: TripayConfig,
    pub webhook: WebhookConfig,
    /// Where Tripay sends the customer after checkout.
    pub return_url: String,
    /// JSON array of products upserted at startup.
    pub product_seed_path: Option<String>,
    pub otlp_endpoint: Option<String>,
    pub service_name: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone, Debug)]
pub struct DatabaseConfig {
    pub url: Secret<String>,
    pub db_name: String,
}

#[derive(Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TripayMode {
    Development,
    Production,
}

impl TripayMode {
    pub fn parse(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "development" => Ok(Self::Development),
            "production" => Ok(Self::Production),
            other => anyhow::bail!("unknown TRIPAY_MODE '{}'", other),
        }
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct TripayConfig {
    pub merchant_code: String,
    pub api_key: Secret<String>,
    pub private_key: Secret<String>,
    pub mode: TripayMode,
    /// Overrides the mode-selected endpoint.
    pub base_url: Option<String>,
    pub request_timeout_secs: u64,
}

impl TripayConfig {
    pub fn base_url(&self) -> &str {
        match (&self.base_url, self.mode) {
            (Some(url), _) => url.trim_end_matches('/'),
            (None, TripayMode::Development) => TRIPAY_SANDBOX_URL,
            (None, TripayMode::Production) => TRIPAY_PRODUCTION_URL,
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Deserialize, Clone, Debug)]
pub struct WebhookConfig {
    pub timeout_secs: u64,
}

impl WebhookConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn required(name: &str) -> Result<String> {
    env::var(name).with_context(|| format!("{} must be set", name))
}

fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed_or<T: std::str::FromStr>(name: &str, default: T) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(name) {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("{} has an invalid value '{}'", name, raw)),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        let host = optional("TRANSACTION_SERVICE_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parsed_or("TRANSACTION_SERVICE_PORT", 3010u16)?;

        let db_url = required("TRANSACTION_DATABASE_URL")?;
        let db_name =
            optional("TRANSACTION_DATABASE_NAME").unwrap_or_else(|| "transaction_db".to_string());

        let mode = match optional("TRIPAY_MODE") {
            Some(raw) => TripayMode::parse(&raw)?,
            None => TripayMode::Development,
        };

        Ok(Self {
            server: ServerConfig { host, port },
            database: DatabaseConfig {
                url: Secret::new(db_url),
                db_name,
            },
            tripay: TripayConfig {
                merchant_code: required("TRIPAY_MERCHANT_CODE")?,
                api_key: Secret::new(required("TRIPAY_API_KEY")?),
                private_key: Secret::new(required("TRIPAY_PRIVATE_KEY")?),
                mode,
                base_url: optional("TRIPAY_BASE_URL"),
                request_timeout_secs: parsed_or("TRIPAY_REQUEST_TIMEOUT_SECS", 30u64)?,
            },
            webhook: WebhookConfig {
                timeout_secs: parsed_or("WEBHOOK_TIMEOUT_SECS", 10u64)?,
            },
            return_url: required("RETURN_URL")?,
            product_seed_path: optional("PRODUCT_SEED_PATH"),
            otlp_endpoint: optional("OTEL_EXPORTER_OTLP_ENDPOINT"),
            service_name: "transaction-service".to_string(),
        })
    }
}
