use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

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
    pub risk: RiskSettings,
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

        let defaults = RiskSettings::default();
        let risk = RiskSettings {
            night_start_hour: hour_var("RISK_NIGHT_START_HOUR", defaults.night_start_hour)?,
            night_end_hour: hour_var("RISK_NIGHT_END_HOUR", defaults.night_end_hour)?,
            isolation_poi_threshold: threshold_var(
                "RISK_ISOLATION_POI_THRESHOLD",
                defaults.isolation_poi_threshold,
            )?,
            night_isolation_poi_threshold: threshold_var(
                "RISK_NIGHT_ISOLATION_POI_THRESHOLD",
                defaults.night_isolation_poi_threshold,
            )?,
            model_path: env::var("RISK_MODEL_PATH")
                .ok()
                .filter(|value| !value.trim().is_empty())
                .map(PathBuf::from),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            risk,
        })
    }
}

fn hour_var(name: &'static str, default: u8) -> Result<u8, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u8>()
            .ok()
            .filter(|hour| *hour <= 23)
            .ok_or(ConfigError::InvalidHour { variable: name }),
        Err(_) => Ok(default),
    }
}

fn threshold_var(name: &'static str, default: u32) -> Result<u32, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidThreshold { variable: name }),
        Err(_) => Ok(default),
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

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Knobs for deriving night and isolation flags at the request boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskSettings {
    pub night_start_hour: u8,
    pub night_end_hour: u8,
    pub isolation_poi_threshold: u32,
    pub night_isolation_poi_threshold: u32,
    pub model_path: Option<PathBuf>,
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            night_start_hour: 20,
            night_end_hour: 6,
            isolation_poi_threshold: 3,
            night_isolation_poi_threshold: 5,
            model_path: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidHour { variable: &'static str },
    InvalidThreshold { variable: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidHour { variable } => {
                write!(f, "{variable} must be an hour between 0 and 23")
            }
            ConfigError::InvalidThreshold { variable } => {
                write!(f, "{variable} must be a non-negative integer")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidHour { .. }
            | ConfigError::InvalidThreshold { .. } => None,
        }
    }
}
