//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

const DEFAULT_GENERATION_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Where `GET /api/agencies` reads the catalog from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogSource {
    Database,
    File,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub generation_api_keys: Vec<String>,
    pub generation_api_base: String,
    pub chat_model: String,
    pub vision_model: String,
    pub title_model: String,
    pub embedding_model: String,
    pub vector_index_api_key: String,
    pub vector_index_name: String,
    pub vector_index_host: String,
    pub vector_top_k: usize,
    pub catalog_source: CatalogSource,
    pub agencies_file: PathBuf,
    pub cors_allowed_origin: String,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            var(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingVar(key.to_string()))
        };
        let or_default = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        // --- Server and Database Settings ---
        let bind_address_str = or_default("BIND_ADDRESS", "0.0.0.0:3000");
        let mut bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;
        if let Some(port) = var("PORT") {
            let port = port.parse::<u16>().map_err(|e| {
                ConfigError::InvalidValue("PORT".to_string(), e.to_string())
            })?;
            bind_address.set_port(port);
        }

        let database_url = required("DATABASE_URL")?;

        let log_level_str = or_default("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Generative API ---
        let generation_api_keys: Vec<String> = var("GEMINI_API_KEYS")
            .or_else(|| var("GEMINI_API_KEY"))
            .map(|keys| {
                keys.split(',')
                    .map(str::trim)
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        if generation_api_keys.is_empty() {
            return Err(ConfigError::MissingVar("GEMINI_API_KEYS".to_string()));
        }

        let generation_api_base = or_default("GENERATION_API_BASE", DEFAULT_GENERATION_API_BASE);
        let chat_model = or_default("CHAT_MODEL", "gemini-2.0-flash");
        let vision_model = or_default("VISION_MODEL", "gemini-2.0-flash");
        let title_model = or_default("TITLE_MODEL", "gemini-2.0-flash-lite");
        let embedding_model = or_default("EMBEDDING_MODEL", "text-embedding-004");

        // --- Vector Index ---
        let vector_index_api_key = required("PINECONE_API_KEY")?;
        let vector_index_name = or_default("PINECONE_INDEX_NAME", "eldercare-agencies");
        let vector_index_host = required("PINECONE_INDEX_HOST")?;
        let vector_top_k_str = or_default("VECTOR_TOP_K", "5");
        let vector_top_k = match vector_top_k_str.parse::<usize>() {
            Ok(k) if k > 0 => k,
            _ => {
                return Err(ConfigError::InvalidValue(
                    "VECTOR_TOP_K".to_string(),
                    format!("'{}' is not a positive integer", vector_top_k_str),
                ))
            }
        };

        // --- Catalog ---
        let catalog_source = match or_default("CATALOG_SOURCE", "database").to_lowercase().as_str() {
            "database" | "db" => CatalogSource::Database,
            "file" => CatalogSource::File,
            other => {
                return Err(ConfigError::InvalidValue(
                    "CATALOG_SOURCE".to_string(),
                    format!("'{}' must be 'database' or 'file'", other),
                ))
            }
        };
        let agencies_file = PathBuf::from(or_default("AGENCIES_FILE", "./data/agencies.json"));

        let cors_allowed_origin = or_default("CORS_ALLOWED_ORIGIN", "*");

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            generation_api_keys,
            generation_api_base,
            chat_model,
            vision_model,
            title_model,
            embedding_model,
            vector_index_api_key,
            vector_index_name,
            vector_index_host,
            vector_top_k,
            catalog_source,
            agencies_file,
            cors_allowed_origin,
        })
    }
}
