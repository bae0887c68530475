use crate::config::{AppEnvironment, TelemetryConfig};
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    Filter { directive: String, source: ParseError },
    Init(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Filter { directive, .. } => {
                write!(f, "log filter '{directive}' is not a valid directive")
            }
            TelemetryError::Init(err) => {
                write!(f, "unable to install tracing subscriber: {err}")
            }
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::Filter { source, .. } => Some(source),
            TelemetryError::Init(err) => Some(&**err),
        }
    }
}

/// Filter built from the configured level; `RUST_LOG` still wins when set.
fn configured_filter(config: &TelemetryConfig) -> Result<EnvFilter, TelemetryError> {
    EnvFilter::try_new(&config.log_level).map_err(|source| TelemetryError::Filter {
        directive: config.log_level.clone(),
        source,
    })
}

/// Installs the process-wide subscriber. Submission logs carry structured
/// fields (protocol, attachment count), so the format stays compact and
/// single-line; ANSI coloring is reserved for a developer terminal.
pub fn init(config: &TelemetryConfig, environment: AppEnvironment) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => configured_filter(config)?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(environment == AppEnvironment::Development)
        .compact()
        .try_init()
        .map_err(TelemetryError::Init)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_filter_accepts_level_and_target_directives() {
        let config = TelemetryConfig {
            log_level: "info,lettre=warn".to_string(),
        };
        assert!(configured_filter(&config).is_ok());
    }

    #[test]
    fn configured_filter_reports_the_bad_directive() {
        let config = TelemetryConfig {
            log_level: "info=debug=trace".to_string(),
        };
        match configured_filter(&config) {
            Err(TelemetryError::Filter { directive, .. }) => {
                assert_eq!(directive, "info=debug=trace");
            }
            other => panic!("expected filter error, got {other:?}"),
        }
    }
}
