use tracing_subscriber::{
    filter::ParseError, fmt, layer::SubscriberExt, util::SubscriberInitExt,
    util::TryInitError, EnvFilter,
};

#[derive(thiserror::Error, Debug)]
pub enum LoggingError {
    #[error("invalid log filter {directive:?}: {source}")]
    InvalidFilter {
        directive: String,
        source: ParseError,
    },
    #[error("failed to initialize logging: {0}")]
    Init(#[from] TryInitError),
}

/// Install the global subscriber, filtered by `directive`
pub fn init_logging(directive: &str) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_new(directive).map_err(|source| LoggingError::InvalidFilter {
        directive: directive.to_owned(),
        source,
    })?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .try_init()?;
    Ok(())
}
