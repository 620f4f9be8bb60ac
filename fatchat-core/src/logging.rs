use tracing_subscriber::EnvFilter;

/// Install the global fmt subscriber. `RUST_LOG` wins, otherwise `info`.
pub fn init() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
