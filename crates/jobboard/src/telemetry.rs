use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

const SERVICE_TARGETS: [&str; 2] = ["jobboard", "jobboard_api"];
const DEPENDENCY_LEVEL: &str = "warn";

#[derive(Debug)]
pub enum TelemetryError {
    InvalidFilter { directive: String, source: ParseError },
    AlreadyInstalled(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::InvalidFilter { directive, .. } => {
                write!(f, "invalid log filter '{}'", directive)
            }
            TelemetryError::AlreadyInstalled(err) => {
                write!(f, "tracing subscriber already installed: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::InvalidFilter { source, .. } => Some(source),
            TelemetryError::AlreadyInstalled(err) => Some(&**err),
        }
    }
}

/// Expand `APP_LOG_LEVEL` into a filter directive.
///
/// A bare level such as `debug` applies to the service crates only and keeps
/// dependencies at `warn`. Anything containing a target or a list is taken
/// verbatim.
pub fn directive_for(log_level: &str) -> String {
    let level = log_level.trim();
    if level.contains('=') || level.contains(',') {
        return level.to_string();
    }

    let mut directive = DEPENDENCY_LEVEL.to_string();
    for target in SERVICE_TARGETS {
        directive.push_str(&format!(",{target}={level}"));
    }
    directive
}

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directive = directive_for(&config.log_level);
            EnvFilter::try_new(&directive)
                .map_err(|source| TelemetryError::InvalidFilter { directive, source })?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::AlreadyInstalled)
}
