use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::relevance::embedder::DEFAULT_MODEL;

/// Which embedding backend the relevance engine talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingBackend {
    /// OpenAI-compatible embeddings server.
    Http,
    /// Offline feature hashing (development, demos).
    Hashing,
}

impl FromStr for EmbeddingBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "http" => Ok(EmbeddingBackend::Http),
            "hashing" => Ok(EmbeddingBackend::Hashing),
            other => Err(anyhow!("expected 'http' or 'hashing', got '{other}'")),
        }
    }
}

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub embedding_backend: EmbeddingBackend,
    pub embedding_url: String,
    pub embedding_model: String,
    pub embedding_api_key: Option<String>,
    /// 0 = unbounded.
    pub embedding_cache_capacity: u64,
    pub similarity_weight: f64,
    pub impressiveness_weight: f64,
    pub tailor_timeout_secs: u64,
    pub template_dir: Option<PathBuf>,
    pub tectonic_bin: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8000,
            rust_log: "info".to_string(),
            embedding_backend: EmbeddingBackend::Http,
            embedding_url: "http://localhost:8080".to_string(),
            embedding_model: DEFAULT_MODEL.to_string(),
            embedding_api_key: None,
            embedding_cache_capacity: 0,
            similarity_weight: 0.4,
            impressiveness_weight: 0.6,
            tailor_timeout_secs: 120,
            template_dir: None,
            tectonic_bin: "tectonic".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let defaults = Config::default();
        Ok(Config {
            port: parse_env("PORT", defaults.port)?,
            rust_log: env_or("RUST_LOG", defaults.rust_log),
            embedding_backend: parse_env("EMBEDDING_BACKEND", defaults.embedding_backend)?,
            embedding_url: env_or("EMBEDDING_URL", defaults.embedding_url),
            embedding_model: env_or("EMBEDDING_MODEL", defaults.embedding_model),
            embedding_api_key: optional_env("EMBEDDING_API_KEY"),
            embedding_cache_capacity: parse_env(
                "EMBEDDING_CACHE_CAPACITY",
                defaults.embedding_cache_capacity,
            )?,
            similarity_weight: parse_env("SIMILARITY_WEIGHT", defaults.similarity_weight)?,
            impressiveness_weight: parse_env(
                "IMPRESSIVENESS_WEIGHT",
                defaults.impressiveness_weight,
            )?,
            tailor_timeout_secs: parse_env("TAILOR_TIMEOUT_SECS", defaults.tailor_timeout_secs)?,
            template_dir: optional_env("TEMPLATE_DIR").map(PathBuf::from),
            tectonic_bin: env_or("TECTONIC_BIN", defaults.tectonic_bin),
        })
    }
}

/// Set and non-empty, or `None`.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: String) -> String {
    optional_env(key).unwrap_or(default)
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match optional_env(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.embedding_backend, EmbeddingBackend::Http);
        assert_eq!(config.embedding_cache_capacity, 0);
        assert_eq!(config.tailor_timeout_secs, 120);
        assert_eq!(config.tectonic_bin, "tectonic");
    }

    #[test]
    fn test_backend_parsing() {
        assert_eq!(
            "Hashing".parse::<EmbeddingBackend>().unwrap(),
            EmbeddingBackend::Hashing
        );
        assert!("onnx".parse::<EmbeddingBackend>().is_err());
    }

    #[test]
    fn test_parse_env_reports_key() {
        std::env::set_var("TAILOR_TEST_BAD_PORT", "eighty");
        let err = parse_env::<u16>("TAILOR_TEST_BAD_PORT", 1).unwrap_err();
        assert!(format!("{err:#}").contains("TAILOR_TEST_BAD_PORT"));
        std::env::remove_var("TAILOR_TEST_BAD_PORT");
    }

    #[test]
    fn test_parse_env_falls_back_when_unset_or_blank() {
        assert_eq!(parse_env::<u64>("TAILOR_TEST_UNSET_VALUE", 42).unwrap(), 42);
        std::env::set_var("TAILOR_TEST_BLANK_VALUE", "  ");
        assert_eq!(parse_env::<u64>("TAILOR_TEST_BLANK_VALUE", 7).unwrap(), 7);
        std::env::remove_var("TAILOR_TEST_BLANK_VALUE");
    }
}
