use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
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
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let defaults = ScoringConfig::default();
        let scoring = ScoringConfig {
            poll_attempts: positive_var("APP_SCORE_POLL_ATTEMPTS", defaults.poll_attempts)?,
            poll_interval: Duration::from_millis(number_var(
                "APP_SCORE_POLL_INTERVAL_MS",
                defaults.poll_interval.as_millis() as u64,
            )?),
            poll_deadline: Duration::from_millis(number_var(
                "APP_SCORE_POLL_DEADLINE_MS",
                defaults.poll_deadline.as_millis() as u64,
            )?),
            id_attempts: positive_var("APP_ID_ATTEMPTS", defaults.id_attempts)?,
            store_shards: positive_var("APP_STORE_SHARDS", defaults.store_shards as u32)?
                as usize,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            scoring,
        })
    }
}

fn number_var(key: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
        Err(_) => Ok(default),
    }
}

fn positive_var(key: &'static str, default: u32) -> Result<u32, ConfigError> {
    let value = number_var(key, u64::from(default))?;
    match u32::try_from(value) {
        Ok(0) => Err(ConfigError::ZeroNotAllowed { key }),
        Ok(value) => Ok(value),
        Err(_) => Err(ConfigError::InvalidNumber { key }),
    }
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

/// Bounds for identifier generation and the score polling loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringConfig {
    pub poll_attempts: u32,
    pub poll_interval: Duration,
    pub poll_deadline: Duration,
    pub id_attempts: u32,
    pub store_shards: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            poll_attempts: 5,
            poll_interval: Duration::from_millis(20),
            poll_deadline: Duration::from_millis(250),
            id_attempts: 5,
            store_shards: 16,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str },
    ZeroNotAllowed { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => {
                write!(f, "{key} must be a non-negative integer")
            }
            ConfigError::ZeroNotAllowed { key } => write!(f, "{key} must be greater than zero"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::ZeroNotAllowed { .. } => None,
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
            "APP_SCORE_POLL_ATTEMPTS",
            "APP_SCORE_POLL_INTERVAL_MS",
            "APP_SCORE_POLL_DEADLINE_MS",
            "APP_ID_ATTEMPTS",
            "APP_STORE_SHARDS",
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
        assert_eq!(config.server.port, 8080);
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
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 8080));
        reset_env();
    }

    #[test]
    fn reads_polling_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "ci");
        env::set_var("APP_SCORE_POLL_ATTEMPTS", "9");
        env::set_var("APP_SCORE_POLL_INTERVAL_MS", "5");
        env::set_var("APP_SCORE_POLL_DEADLINE_MS", "1000");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.environment, AppEnvironment::Test);
        assert_eq!(config.scoring.poll_attempts, 9);
        assert_eq!(config.scoring.poll_interval, Duration::from_millis(5));
        assert_eq!(config.scoring.poll_deadline, Duration::from_secs(1));
        reset_env();
    }

    #[test]
    fn rejects_zero_attempts() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ID_ATTEMPTS", "0");
        match AppConfig::load() {
            Err(err @ ConfigError::ZeroNotAllowed { key }) => {
                assert_eq!(key, "APP_ID_ATTEMPTS");
                assert_eq!(err.to_string(), "APP_ID_ATTEMPTS must be greater than zero");
            }
            other => panic!("expected zero rejection, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn zero_poll_interval_is_allowed_but_text_is_not() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_SCORE_POLL_INTERVAL_MS", "0");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.scoring.poll_interval, Duration::ZERO);

        env::set_var("APP_SCORE_POLL_DEADLINE_MS", "soon");
        match AppConfig::load() {
            Err(err @ ConfigError::InvalidNumber { .. }) => assert_eq!(
                err.to_string(),
                "APP_SCORE_POLL_DEADLINE_MS must be a non-negative integer"
            ),
            other => panic!("expected invalid number, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn rejects_non_numeric_shards() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_STORE_SHARDS", "many");
        assert!(matches!(
            AppConfig::load(),
            Err(ConfigError::InvalidNumber {
                key: "APP_STORE_SHARDS"
            })
        ));
        reset_env();
    }
}
