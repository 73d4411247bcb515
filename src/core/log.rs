//! Opt-in tracing output for applications embedding the client.
//!
//! Request dispatch is traced at INFO under the `eoddata` target. Response
//! bodies and unwrapping steps are traced at DEBUG. `RUST_LOG` overrides the
//! default level when set.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

const CRATE_TARGET: &str = "eoddata";

fn default_levels(verbose: bool) -> (LevelFilter, &'static str) {
    if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::INFO, "info")
    }
}

/// Installs a global subscriber for the client's traces.
///
/// Returns `false` when the host application already installed one, in
/// which case the existing subscriber is left untouched.
pub fn init_logging(verbose: bool) -> bool {
    let (level_filter, level) = default_levels(verbose);
    let crate_filter = Targets::new().with_target(CRATE_TARGET, level_filter);
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time())
        .with(crate_filter)
        .with(env_filter)
        .try_init()
        .is_ok()
}
