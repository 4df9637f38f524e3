//! Tracing setup for the binary.

use table_planner_error::{ConfigError, PlannerResult};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,table_planner=debug";

/// Install a console subscriber.
///
/// `RUST_LOG` wins when set; otherwise `verbose` selects `debug` for every
/// target, and the default filter applies.
///
/// # Errors
///
/// Returns a configuration error if a global subscriber is already installed.
pub fn init_tracing(verbose: bool) -> PlannerResult<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new(DEFAULT_FILTER)
        }
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .try_init()
        .map_err(|e| ConfigError::new(format!("Failed to install tracing subscriber: {}", e)))?;

    Ok(())
}
