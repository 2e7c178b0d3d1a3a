use crate::cli::{
    actions::Action,
    commands::{self, logging},
    dispatch::handler,
    telemetry,
};
use anyhow::Result;

/// Parse the command line, install logging and resolve the action to run.
///
/// # Errors
/// Returns an error if logging cannot be initialized or the arguments are inconsistent.
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    let verbosity_level = match matches
        .get_one::<u8>(logging::ARG_VERBOSITY)
        .map_or(0, |&v| v)
    {
        0 => tracing::Level::ERROR,
        1 => tracing::Level::WARN,
        2 => tracing::Level::INFO,
        3 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let json = matches.get_flag(logging::ARG_LOG_JSON);
    telemetry::init(Some(verbosity_level), json)?;

    handler(&matches)
}
