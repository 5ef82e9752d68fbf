//! Tracing subscriber setup for the binary.

use std::io::IsTerminal;
use std::sync::Once;
use tracing_subscriber::EnvFilter;

/// Installs the global fmt subscriber. Later calls are no-ops.
///
/// The filter comes from `SAVEROWS_LOG`; a directive that does not parse
/// falls back to the default level.
pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let directive = config::log_filter();
        let filter = EnvFilter::try_new(&directive)
            .unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_FILTER));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .init();

        tracing::debug!(filter = %directive, "logging initialized");
    });
}
