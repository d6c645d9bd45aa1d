use tracing_subscriber::EnvFilter;

/// JSON log lines to stdout, container style. `RUST_LOG` wins over the
/// configured level so local overrides stay possible.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .json()
        .flatten_event(true)
        .with_env_filter(filter)
        .init();
}
