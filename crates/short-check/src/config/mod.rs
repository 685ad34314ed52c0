use std::env;
use std::fmt;
use std::fs;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::scoring::{KeywordTables, ScoringConfig};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring: ScoringConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let keywords = match env::var("SHORT_CHECK_KEYWORDS") {
            Ok(path) if !path.trim().is_empty() => load_keyword_tables(PathBuf::from(path))?,
            _ => KeywordTables::default(),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring: ScoringConfig {
                keywords,
                ..ScoringConfig::default()
            },
        })
    }
}

/// Reads a JSON keyword table; missing sections fall back to the built-in lists.
pub fn load_keyword_tables(path: PathBuf) -> Result<KeywordTables, ConfigError> {
    let raw = fs::read_to_string(&path).map_err(|source| ConfigError::KeywordTable {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::KeywordTableFormat { path, source })
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    KeywordTable {
        path: PathBuf,
        source: std::io::Error,
    },
    KeywordTableFormat {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::KeywordTable { path, .. } => {
                write!(f, "unable to read keyword table {}", path.display())
            }
            ConfigError::KeywordTableFormat { path, .. } => {
                write!(f, "keyword table {} is not valid JSON", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::KeywordTable { source, .. } => Some(source),
            ConfigError::KeywordTableFormat { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::DilutionMechanism;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("SHORT_CHECK_KEYWORDS");
    }

    fn temp_keyword_file(name: &str, contents: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("short-check-{}-{name}", std::process::id()));
        fs::write(&path, contents).expect("write keyword table");
        path
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.scoring, ScoringConfig::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        reset_env();
    }

    #[test]
    fn rejects_invalid_port() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_PORT", "not-a-port");
        let err = AppConfig::load().expect_err("port must be numeric");
        assert!(matches!(err, ConfigError::InvalidPort));
        reset_env();
    }

    #[test]
    fn keyword_table_overrides_only_supplied_sections() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let path = temp_keyword_file(
            "partial.json",
            r#"{ "news": { "bullish": ["uplisting"] } }"#,
        );
        env::set_var("SHORT_CHECK_KEYWORDS", &path);

        let config = AppConfig::load().expect("config loads");
        let keywords = &config.scoring.keywords;
        assert_eq!(keywords.news.bullish, vec!["uplisting".to_string()]);
        assert_eq!(
            keywords.news.neutral,
            crate::scoring::NewsKeywords::default().neutral
        );
        assert!(keywords.dilution.contains_key(&DilutionMechanism::Atm));

        reset_env();
        let _ = fs::remove_file(path);
    }

    #[test]
    fn malformed_keyword_table_is_reported() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let path = temp_keyword_file("broken.json", "{ not json");
        env::set_var("SHORT_CHECK_KEYWORDS", &path);

        let err = AppConfig::load().expect_err("broken table fails");
        assert!(matches!(err, ConfigError::KeywordTableFormat { .. }));

        reset_env();
        let _ = fs::remove_file(path);
    }
}
