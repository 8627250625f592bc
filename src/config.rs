use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "compact" => Ok(LogFormat::Compact),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format {other}, expected compact/json")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub http_port: u16,
    pub backend_url: String,
    pub log_level: String,
    pub log_format: LogFormat,
    /// Unset keeps the session slot in memory only.
    pub session_file: Option<PathBuf>,
    pub session_poll_ms: u64,
    pub event_buffer_size: usize,
    pub backend_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            http_port: parse_or_default(&lookup, "HTTP_PORT", 3000)?,
            backend_url: lookup("BACKEND_URL")
                .unwrap_or_else(|| "http://127.0.0.1:8000".to_string()),
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format: parse_or_default(&lookup, "LOG_FORMAT", LogFormat::Compact)?,
            session_file: lookup("SESSION_FILE")
                .filter(|raw| !raw.trim().is_empty())
                .map(PathBuf::from),
            session_poll_ms: parse_or_default(&lookup, "SESSION_POLL_MS", 500)?,
            event_buffer_size: parse_or_default(&lookup, "EVENT_BUFFER_SIZE", 64)?,
            backend_timeout_secs: parse_or_default(&lookup, "BACKEND_TIMEOUT_SECS", 10)?,
        })
    }

    pub fn session_poll_interval(&self) -> Duration {
        Duration::from_millis(self.session_poll_ms)
    }

    pub fn backend_timeout(&self) -> Duration {
        Duration::from_secs(self.backend_timeout_secs)
    }
}

fn parse_or_default<F, T>(lookup: &F, key: &str, default: T) -> Result<T, AppError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|err| AppError::Internal(format!("invalid {key}: {err}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::path::PathBuf;

    use super::{Config, LogFormat};

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, crate::error::AppError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.http_port, 3000);
        assert_eq!(config.backend_url, "http://127.0.0.1:8000");
        assert_eq!(config.log_format, LogFormat::Compact);
        assert_eq!(config.session_file, None);
        assert_eq!(config.session_poll_ms, 500);
    }

    #[test]
    fn overrides_are_parsed() {
        let config = config_from(&[
            ("HTTP_PORT", "8080"),
            ("LOG_FORMAT", "JSON"),
            ("SESSION_FILE", "/var/lib/portal/session"),
            ("SESSION_POLL_MS", "250"),
        ])
        .unwrap();
        assert_eq!(config.http_port, 8080);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(
            config.session_file,
            Some(PathBuf::from("/var/lib/portal/session"))
        );
        assert_eq!(config.session_poll_interval().as_millis(), 250);
    }

    #[test]
    fn invalid_values_are_reported_with_their_key() {
        let err = config_from(&[("HTTP_PORT", "eighty")]).unwrap_err();
        assert!(err.to_string().contains("HTTP_PORT"));
    }
}
