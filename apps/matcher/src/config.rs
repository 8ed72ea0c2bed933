use anyhow::{Context, Result};

/// Per-file upload cap enforced by the resume form.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
/// Whole-request cap. Must stay above the per-file cap so oversized files
/// reach the form validator instead of failing inside the multipart reader.
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 32 * 1024 * 1024;
pub const DEFAULT_SNIPPET_CHARS: usize = 500;

/// Application configuration loaded from environment variables.
/// Every value has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub max_upload_bytes: usize,
    pub max_request_bytes: usize,
    pub snippet_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            rust_log: "info".to_string(),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            max_request_bytes: DEFAULT_MAX_REQUEST_BYTES,
            snippet_chars: DEFAULT_SNIPPET_CHARS,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let config = Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            max_upload_bytes: parse_env("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            max_request_bytes: parse_env("MAX_REQUEST_BYTES", DEFAULT_MAX_REQUEST_BYTES)?,
            snippet_chars: parse_env("SNIPPET_CHARS", DEFAULT_SNIPPET_CHARS)?,
        };

        anyhow::ensure!(
            config.max_request_bytes > config.max_upload_bytes,
            "MAX_REQUEST_BYTES ({}) must be larger than MAX_UPLOAD_BYTES ({})",
            config.max_request_bytes,
            config.max_upload_bytes
        );

        Ok(config)
    }
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_request_limit_above_file_limit() {
        let config = Config::default();
        assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
        assert!(config.max_request_bytes > config.max_upload_bytes);
        assert_eq!(config.snippet_chars, 500);
    }

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let value: usize = parse_env("MATCHER_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
