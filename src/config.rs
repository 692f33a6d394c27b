use anyhow::{Context, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection string, e.g. "sqlite:./snaplink.db".
    /// "memory:" selects the in-process store (nothing is persisted).
    pub database_url: String,

    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Public base URL used when generating short links, e.g. "https://go.example.com".
    /// Stored without a trailing slash. When unset the base URL is inferred
    /// per request from `x-forwarded-proto` and `host`.
    pub base_url: Option<String>,

    /// Number of symbols in a generated short code
    pub code_length: usize,

    /// How many fresh codes to try before reporting exhaustion
    pub max_attempts: u32,

    /// Upper bound on any single store call
    pub store_timeout: Duration,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = var("PORT")
            .unwrap_or_else(|| "3000".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let code_length = var("CODE_LENGTH")
            .unwrap_or_else(|| "7".into())
            .parse::<usize>()
            .context("CODE_LENGTH must be a positive integer")?;
        if code_length == 0 {
            anyhow::bail!("CODE_LENGTH must be greater than zero");
        }

        let max_attempts = var("MAX_ATTEMPTS")
            .unwrap_or_else(|| "10".into())
            .parse::<u32>()
            .context("MAX_ATTEMPTS must be a positive integer")?;
        if max_attempts == 0 {
            anyhow::bail!("MAX_ATTEMPTS must be greater than zero");
        }

        let store_timeout_ms = var("STORE_TIMEOUT_MS")
            .unwrap_or_else(|| "5000".into())
            .parse::<u64>()
            .context("STORE_TIMEOUT_MS must be a number of milliseconds")?;

        let base_url = var("BASE_URL")
            .map(|u| u.trim().trim_end_matches('/').to_owned())
            .filter(|u| !u.is_empty());

        Ok(Self {
            database_url: var("DATABASE_URL").unwrap_or_else(|| "sqlite:./snaplink.db".into()),
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            base_url,
            code_length,
            max_attempts,
            store_timeout: Duration::from_millis(store_timeout_ms),
        })
    }

    pub fn uses_memory_store(&self) -> bool {
        self.database_url == "memory:"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<AppConfig> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let cfg = load(&[]).unwrap();
        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.host, "0.0.0.0");
        assert_eq!(cfg.code_length, 7);
        assert_eq!(cfg.max_attempts, 10);
        assert_eq!(cfg.store_timeout, Duration::from_millis(5000));
        assert!(cfg.base_url.is_none());
        assert!(!cfg.uses_memory_store());
    }

    #[test]
    fn base_url_is_trimmed() {
        let cfg = load(&[("BASE_URL", " https://s.example/ ")]).unwrap();
        assert_eq!(cfg.base_url.as_deref(), Some("https://s.example"));

        let cfg = load(&[("BASE_URL", "  ")]).unwrap();
        assert!(cfg.base_url.is_none());
    }

    #[test]
    fn rejects_zero_and_garbage() {
        assert!(load(&[("CODE_LENGTH", "0")]).is_err());
        assert!(load(&[("MAX_ATTEMPTS", "0")]).is_err());
        assert!(load(&[("PORT", "http")]).is_err());
        assert!(load(&[("STORE_TIMEOUT_MS", "-1")]).is_err());
    }

    #[test]
    fn memory_store_selection() {
        let cfg = load(&[("DATABASE_URL", "memory:")]).unwrap();
        assert!(cfg.uses_memory_store());
    }
}
