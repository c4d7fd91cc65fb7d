use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

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

/// Top-level configuration for the explorer service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub data: DataConfig,
    pub model: ModelConfig,
    pub narrative: NarrativeConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));

        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = var_or("APP_LOG_LEVEL", "info");
        let log_format = LogFormat::from_str(&var_or("APP_LOG_FORMAT", "compact"));

        let timeout = match env::var("NARRATIVE_TIMEOUT_SECS") {
            Ok(raw) if !raw.trim().is_empty() => {
                let secs = raw
                    .trim()
                    .parse::<u64>()
                    .map_err(|_| ConfigError::InvalidTimeout { value: raw.clone() })?;
                Some(Duration::from_secs(secs))
            }
            _ => None,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                format: log_format,
            },
            data: DataConfig {
                companies_csv: PathBuf::from(var_or("APP_DATA_PATH", "data/df_demo.csv")),
            },
            model: ModelConfig {
                model_path: PathBuf::from(var_or("APP_MODEL_PATH", "ml-model/model.json")),
                scaler_path: PathBuf::from(var_or("APP_SCALER_PATH", "ml-model/scaler.json")),
            },
            narrative: NarrativeConfig {
                base_url: var_or("NARRATIVE_BASE_URL", "http://localhost:11434"),
                chat_path: var_or("NARRATIVE_CHAT_PATH", "/api/chat"),
                model: var_or("NARRATIVE_MODEL", "qwen2.5:0.5b"),
                timeout,
            },
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
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

/// Log filter and output shape.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "json" => Self::Json,
            _ => Self::Compact,
        }
    }
}

/// Location of the company dataset.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub companies_csv: PathBuf,
}

/// Locations of the persisted rating model and its feature scaler.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub scaler_path: PathBuf,
}

/// Chat-completion endpoint used for analyst commentary.
#[derive(Debug, Clone)]
pub struct NarrativeConfig {
    pub base_url: String,
    pub chat_path: String,
    pub model: String,
    /// `None` keeps the HTTP client's default behavior.
    pub timeout: Option<Duration>,
}

impl NarrativeConfig {
    pub fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if self.chat_path.starts_with('/') {
            format!("{base}{}", self.chat_path)
        } else {
            format!("{base}/{}", self.chat_path)
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidTimeout { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidTimeout { value } => write!(
                f,
                "NARRATIVE_TIMEOUT_SECS must be a whole number of seconds (got '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidTimeout { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        for key in [
            "APP_ENV",
            "APP_HOST",
            "APP_PORT",
            "APP_LOG_LEVEL",
            "APP_LOG_FORMAT",
            "APP_DATA_PATH",
            "APP_MODEL_PATH",
            "APP_SCALER_PATH",
            "NARRATIVE_BASE_URL",
            "NARRATIVE_CHAT_PATH",
            "NARRATIVE_MODEL",
            "NARRATIVE_TIMEOUT_SECS",
        ] {
            env::remove_var(key);
        }
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
        assert_eq!(config.telemetry.format, LogFormat::Compact);
        assert_eq!(config.data.companies_csv, PathBuf::from("data/df_demo.csv"));
        assert_eq!(config.model.model_path, PathBuf::from("ml-model/model.json"));
        assert_eq!(config.model.scaler_path, PathBuf::from("ml-model/scaler.json"));
        assert_eq!(config.narrative.model, "qwen2.5:0.5b");
        assert!(config.narrative.timeout.is_none());
        assert_eq!(
            config.narrative.endpoint(),
            "http://localhost:11434/api/chat"
        );
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
    fn rejects_non_numeric_timeout() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("NARRATIVE_TIMEOUT_SECS", "soon");
        let error = AppConfig::load().expect_err("timeout must be numeric");
        assert!(matches!(error, ConfigError::InvalidTimeout { .. }));
        reset_env();
    }

    #[test]
    fn reads_narrative_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("NARRATIVE_BASE_URL", "http://llm.internal:8080/");
        env::set_var("NARRATIVE_CHAT_PATH", "v1/chat");
        env::set_var("NARRATIVE_TIMEOUT_SECS", "45");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.narrative.endpoint(), "http://llm.internal:8080/v1/chat");
        assert_eq!(config.narrative.timeout, Some(Duration::from_secs(45)));
        reset_env();
    }
}
