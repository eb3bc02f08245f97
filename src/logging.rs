use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "blocklab_api=info,tower_http=info";

/// Install the global `tracing` subscriber. `RUST_LOG` overrides the default filter.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    // A second call (tests, embedding) keeps the subscriber already installed.
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
