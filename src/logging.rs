use tracing_subscriber::EnvFilter;

/// Filter directives are read from this variable, e.g. `design_tokens=debug`.
pub const LOG_ENV: &str = "DESIGN_TOKENS_LOG";
const DEFAULT_DIRECTIVE: &str = "warn";

/// Installs the stderr subscriber. Calling it twice is harmless.
pub fn init() {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVE));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
