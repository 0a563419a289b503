use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

const DEV_JWT_SECRET: &str = "jobboard-development-secret-change-me";
const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 << 20;

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

    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
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

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => secret,
            _ if environment.is_production() => return Err(ConfigError::MissingSecret),
            _ => DEV_JWT_SECRET.to_string(),
        };
        let token_ttl_hours = parse_number("JWT_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS)?;
        if token_ttl_hours <= 0 {
            return Err(ConfigError::InvalidNumber {
                key: "JWT_TTL_HOURS",
            });
        }

        let upload_dir = env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string());
        let max_upload_bytes = parse_number("UPLOAD_MAX_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
        if max_upload_bytes == 0 {
            return Err(ConfigError::InvalidNumber {
                key: "UPLOAD_MAX_BYTES",
            });
        }

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            auth: AuthConfig {
                jwt_secret,
                token_ttl_hours,
            },
            storage: StorageConfig {
                upload_dir: PathBuf::from(upload_dir),
                max_upload_bytes,
            },
        })
    }
}

fn parse_number<T>(key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidNumber { key }),
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

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Token signing material handed to the credential layer.
#[derive(Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .finish()
    }
}

/// Where uploaded resumes land and how large they may be.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidNumber { key: &'static str },
    MissingSecret,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key } => write!(f, "{key} must be a positive number"),
            ConfigError::MissingSecret => {
                write!(f, "JWT_SECRET is required when APP_ENV is production")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::MissingSecret => None,
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
            "JWT_SECRET",
            "JWT_TTL_HOURS",
            "UPLOAD_DIR",
            "UPLOAD_MAX_BYTES",
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
        assert_eq!(config.auth.jwt_secret, DEV_JWT_SECRET);
        assert_eq!(config.auth.token_ttl_hours, 24);
        assert_eq!(config.storage.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.storage.max_upload_bytes, 5 * 1024 * 1024);
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
    fn production_requires_explicit_secret() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_ENV", "production");
        assert!(matches!(AppConfig::load(), Err(ConfigError::MissingSecret)));

        env::set_var("JWT_SECRET", "prod-secret");
        let config = AppConfig::load().expect("secret provided");
        assert!(config.environment.is_production());
        assert_eq!(config.auth.jwt_secret, "prod-secret");
        reset_env();
    }

    #[test]
    fn rejects_malformed_numbers() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("UPLOAD_MAX_BYTES", "lots");
        match AppConfig::load() {
            Err(ConfigError::InvalidNumber { key }) => assert_eq!(key, "UPLOAD_MAX_BYTES"),
            other => panic!("expected invalid number, got {other:?}"),
        }
        reset_env();
    }

    #[test]
    fn debug_output_redacts_secret() {
        let auth = AuthConfig {
            jwt_secret: "hunter2".to_string(),
            token_ttl_hours: 1,
        };
        let rendered = format!("{auth:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("redacted"));
    }
}
