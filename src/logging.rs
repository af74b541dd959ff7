use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Install the stderr subscriber. `RUST_LOG` overrides the default level.
/// Calling this more than once is harmless.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
