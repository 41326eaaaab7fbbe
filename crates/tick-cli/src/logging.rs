//! Console logging for the CLI.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `TICK_LOG=tick_core=debug`.
pub const LOG_ENV: &str = "TICK_LOG";

/// Initialise stderr logging. Controlled by `TICK_LOG` (default: `warn`), so
/// ordinary runs print nothing but command output.
pub fn init_cli() {
    let env_filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
