use anyhow::{Context, Result};

const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_MAX_FILE_SIZE_MB: u64 = 5;
const DEFAULT_PORT: u16 = 8000;
const BYTES_PER_MB: u64 = 1024 * 1024;

/// Application configuration loaded from environment variables.
/// Startup fails if the completion-service key is missing or a value does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub allowed_origins: Vec<String>,
    pub max_file_size_mb: u64,
    pub debug: bool,
    pub port: u16,
    pub web_concurrency: usize,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let debug = lookup("DEBUG")
            .map(|v| v.trim().to_lowercase() == "true")
            .unwrap_or(false);

        let allowed_origins = parse_origins(
            &lookup("ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_ALLOWED_ORIGIN.to_string()),
        );

        let max_file_size_mb = match lookup("MAX_FILE_SIZE_MB") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .context("MAX_FILE_SIZE_MB must be a whole number of megabytes")?,
            None => DEFAULT_MAX_FILE_SIZE_MB,
        };

        let port = match lookup("PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            None => DEFAULT_PORT,
        };

        let web_concurrency = match lookup("WEB_CONCURRENCY") {
            Some(v) => v
                .trim()
                .parse::<usize>()
                .context("WEB_CONCURRENCY must be a positive integer")?
                .max(1),
            None => 1,
        };

        let rust_log = lookup("RUST_LOG")
            .unwrap_or_else(|| (if debug { "debug" } else { "info" }).to_string());

        Ok(Config {
            groq_api_key: require(&lookup, "GROQ_API_KEY")?,
            allowed_origins,
            max_file_size_mb,
            debug,
            port,
            web_concurrency,
            rust_log,
        })
    }

    /// The configured upload maximum in bytes. Uploads up to this size are
    /// buffered for extraction; anything larger is only counted.
    pub fn max_file_size_bytes(&self) -> usize {
        let limit = self.max_file_size_mb.saturating_mul(BYTES_PER_MB);
        usize::try_from(limit).unwrap_or(usize::MAX)
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn require<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("GROQ_API_KEY", "gsk_test")]).unwrap();
        assert_eq!(config.allowed_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.max_file_size_mb, 5);
        assert!(!config.debug);
        assert_eq!(config.port, 8000);
        assert_eq!(config.web_concurrency, 1);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_missing_api_key_is_an_error() {
        let err = config_from(&[]).unwrap_err();
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_blank_api_key_is_an_error() {
        assert!(config_from(&[("GROQ_API_KEY", "  ")]).is_err());
    }

    #[test]
    fn test_origins_are_split_and_trimmed() {
        let config = config_from(&[
            ("GROQ_API_KEY", "k"),
            (
                "ALLOWED_ORIGINS",
                "https://app.example.com, http://localhost:3000,,",
            ),
        ])
        .unwrap();
        assert_eq!(
            config.allowed_origins,
            vec!["https://app.example.com", "http://localhost:3000"]
        );
    }

    #[test]
    fn test_debug_flag_is_case_insensitive() {
        let config = config_from(&[("GROQ_API_KEY", "k"), ("DEBUG", "TRUE")]).unwrap();
        assert!(config.debug);
        assert_eq!(config.rust_log, "debug");

        let config = config_from(&[("GROQ_API_KEY", "k"), ("DEBUG", "1")]).unwrap();
        assert!(!config.debug);
    }

    #[test]
    fn test_explicit_rust_log_wins_over_debug() {
        let config = config_from(&[
            ("GROQ_API_KEY", "k"),
            ("DEBUG", "true"),
            ("RUST_LOG", "warn"),
        ])
        .unwrap();
        assert_eq!(config.rust_log, "warn");
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        assert!(config_from(&[("GROQ_API_KEY", "k"), ("MAX_FILE_SIZE_MB", "five")]).is_err());
        assert!(config_from(&[("GROQ_API_KEY", "k"), ("PORT", "70000")]).is_err());
        assert!(config_from(&[("GROQ_API_KEY", "k"), ("WEB_CONCURRENCY", "-2")]).is_err());
    }

    #[test]
    fn test_web_concurrency_floor_is_one() {
        let config = config_from(&[("GROQ_API_KEY", "k"), ("WEB_CONCURRENCY", "0")]).unwrap();
        assert_eq!(config.web_concurrency, 1);
    }

    #[test]
    fn test_max_file_size_in_bytes() {
        let config = config_from(&[("GROQ_API_KEY", "k"), ("MAX_FILE_SIZE_MB", "5")]).unwrap();
        assert_eq!(config.max_file_size_bytes(), 5 * 1024 * 1024);

        let config = config_from(&[("GROQ_API_KEY", "k"), ("MAX_FILE_SIZE_MB", "0")]).unwrap();
        assert_eq!(config.max_file_size_bytes(), 0);
    }
}
