use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::requests::{RequestPolicy, TransitionPolicy};

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
    pub requests: RequestPolicyConfig,
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

        let completion_days = env::var("APP_COMPLETION_DAYS")
            .unwrap_or_else(|_| "5".to_string())
            .parse::<i64>()
            .ok()
            .filter(|days| *days > 0)
            .ok_or(ConfigError::InvalidCompletionDays)?;

        let strict_transitions = match env::var("APP_STRICT_TRANSITIONS") {
            Ok(raw) => parse_bool(&raw).ok_or(ConfigError::InvalidStrictTransitions)?,
            Err(_) => true,
        };

        let admin_token = env::var("APP_ADMIN_TOKEN")
            .ok()
            .filter(|token| !token.trim().is_empty());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            requests: RequestPolicyConfig {
                completion_days,
                strict_transitions,
                admin_token,
            },
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
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

/// Lifecycle policy knobs for the document request desk.
#[derive(Debug, Clone)]
pub struct RequestPolicyConfig {
    /// Days promised for fulfillment (`APP_COMPLETION_DAYS`, default 5).
    pub completion_days: i64,
    /// Forward-only transition enforcement (`APP_STRICT_TRANSITIONS`,
    /// default on; off restores the permissive relabeling behavior).
    pub strict_transitions: bool,
    /// Token for the administrative timeline override (`APP_ADMIN_TOKEN`);
    /// unset disables the override endpoint.
    pub admin_token: Option<String>,
}

impl RequestPolicyConfig {
    pub fn to_policy(&self) -> RequestPolicy {
        RequestPolicy {
            completion_days: self.completion_days,
            transitions: TransitionPolicy {
                forward_only: self.strict_transitions,
            },
            ..RequestPolicy::default()
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidCompletionDays,
    InvalidStrictTransitions,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidCompletionDays => {
                write!(f, "APP_COMPLETION_DAYS must be a positive number of days")
            }
            ConfigError::InvalidStrictTransitions => {
                write!(f, "APP_STRICT_TRANSITIONS must be a boolean flag")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
