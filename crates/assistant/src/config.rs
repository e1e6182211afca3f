//! Assistant configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `LLM_API_KEY` - API key for the chat-completions endpoint (falls back
//!   to `OPENAI_API_KEY`)
//!
//! ## Optional
//! - `ASSISTANT_DATABASE_URL` - SQLite URL for the interaction log
//!   (falls back to `DATABASE_URL`; default: `sqlite:data/historico.db`)
//! - `ASSISTANT_HOST` - Bind address (default: 127.0.0.1)
//! - `ASSISTANT_PORT` - Listen port (default: 8000)
//! - `ASSISTANT_CATALOG_PATH` - Product catalog JSON
//!   (default: data/products.json)
//! - `ASSISTANT_POLICY_DOC_PATH` - SAC policy markdown
//!   (default: data/policies.md)
//! - `EMBEDDING_MODEL_ID` - Hugging Face model id
//!   (default: sentence-transformers/all-MiniLM-L6-v2)
//! - `EMBEDDING_MODEL_REVISION` - Model revision (default: main)
//! - `LLM_API_BASE` - Chat-completions base URL
//!   (default: <https://api.openai.com/v1>)
//! - `LLM_MODEL` - Model name (default: gpt-4o-mini)
//! - `LLM_TIMEOUT_SECS` - Per-request timeout (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Assistant application configuration.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// SQLite connection URL for the interaction log
    pub database_url: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Product catalog JSON file
    pub catalog_path: PathBuf,
    /// SAC policy markdown document
    pub policy_doc_path: PathBuf,
    /// Sentence-embedding model configuration
    pub embedding: EmbeddingConfig,
    /// Chat-completions configuration
    pub llm: LlmConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Sentence-embedding model configuration.
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    /// Hugging Face model id
    pub model_id: String,
    /// Model revision (branch, tag or commit)
    pub revision: String,
}

/// Chat-completions configuration.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct LlmConfig {
    /// Base URL of an OpenAI-compatible API
    pub api_base: String,
    /// API key (server-side only)
    pub api_key: SecretString,
    /// Model name
    pub model: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_base", &self.api_base)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AssistantConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let database_url = get_database_url("ASSISTANT_DATABASE_URL", "sqlite:data/historico.db");
        let host = get_env_or_default("ASSISTANT_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("ASSISTANT_HOST".to_owned(), e.to_string()))?;
        let port = get_env_or_default("ASSISTANT_PORT", "8000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("ASSISTANT_PORT".to_owned(), e.to_string()))?;

        let catalog_path = PathBuf::from(get_env_or_default(
            "ASSISTANT_CATALOG_PATH",
            "data/products.json",
        ));
        let policy_doc_path = PathBuf::from(get_env_or_default(
            "ASSISTANT_POLICY_DOC_PATH",
            "data/policies.md",
        ));

        let embedding = EmbeddingConfig::from_env();
        let llm = LlmConfig::from_env()?;
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            database_url,
            host,
            port,
            catalog_path,
            policy_doc_path,
            embedding,
            llm,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl EmbeddingConfig {
    fn from_env() -> Self {
        Self {
            model_id: get_env_or_default(
                "EMBEDDING_MODEL_ID",
                crate::embedding::bert::DEFAULT_MODEL_ID,
            ),
            revision: get_env_or_default("EMBEDDING_MODEL_REVISION", "main"),
        }
    }
}

impl LlmConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let timeout_secs = get_env_or_default("LLM_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("LLM_TIMEOUT_SECS".to_owned(), e.to_string())
            })?;

        Ok(Self {
            api_base: get_env_or_default("LLM_API_BASE", "https://api.openai.com/v1"),
            api_key: get_api_key()?,
            model: get_env_or_default("LLM_MODEL", "gpt-4o-mini"),
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Get the database URL with fallback to generic `DATABASE_URL`.
fn get_database_url(primary_key: &str, default: &str) -> SecretString {
    if let Ok(value) = std::env::var(primary_key) {
        return SecretString::from(value);
    }
    if let Ok(value) = std::env::var("DATABASE_URL") {
        return SecretString::from(value);
    }
    SecretString::from(default)
}

/// Get the LLM API key with fallback to `OPENAI_API_KEY`.
fn get_api_key() -> Result<SecretString, ConfigError> {
    if let Ok(value) = std::env::var("LLM_API_KEY") {
        return Ok(SecretString::from(value));
    }
    if let Ok(value) = std::env::var("OPENAI_API_KEY") {
        return Ok(SecretString::from(value));
    }
    Err(ConfigError::MissingEnvVar("LLM_API_KEY".to_owned()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_llm_config() -> LlmConfig {
        LlmConfig {
            api_base: "https://api.openai.com/v1".to_owned(),
            api_key: SecretString::from("super-secret-key"),
            model: "gpt-4o-mini".to_owned(),
            timeout: Duration::from_secs(30),
        }
    }

    #[test]
    fn test_socket_addr() {
        let config = AssistantConfig {
            database_url: SecretString::from("sqlite::memory:"),
            host: "127.0.0.1".parse().unwrap(),
            port: 8000,
            catalog_path: PathBuf::from("data/products.json"),
            policy_doc_path: PathBuf::from("data/policies.md"),
            embedding: EmbeddingConfig {
                model_id: crate::embedding::bert::DEFAULT_MODEL_ID.to_owned(),
                revision: "main".to_owned(),
            },
            llm: test_llm_config(),
            sentry_dsn: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 8000);
    }

    #[test]
    fn test_llm_config_debug_redacts_api_key() {
        let debug_output = format!("{:?}", test_llm_config());

        assert!(debug_output.contains("gpt-4o-mini"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-key"));
    }
}
