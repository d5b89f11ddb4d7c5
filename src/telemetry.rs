use thiserror::Error;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: &str = "warn";
const VERBOSE_LEVEL: &str = "debug";

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("invalid log level/filter '{value}': unable to build EnvFilter")]
    EnvFilter {
        value: String,
        #[source]
        source: ParseError,
    },

    #[error("telemetry error: {0}")]
    Subscriber(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Filter directive used when `RUST_LOG` is not set
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        VERBOSE_LEVEL
    } else {
        DEFAULT_LEVEL
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `verbose`.
pub fn init(verbose: bool) -> Result<(), TelemetryError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let level = default_filter(verbose);
            EnvFilter::try_new(level).map_err(|source| TelemetryError::EnvFilter {
                value: level.to_string(),
                source,
            })?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init()
        .map_err(TelemetryError::Subscriber)
}
