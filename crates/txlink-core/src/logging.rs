use tracing_subscriber::EnvFilter;

/// Installs a formatting subscriber filtered by `filter` (an `EnvFilter`
/// directive such as `txlink_core=debug`). An empty or invalid directive
/// falls back to `RUST_LOG`, then to `info`.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_logging(filter: &str) -> bool {
    let filter = EnvFilter::try_new(filter)
        .ok()
        .filter(|_| !filter.trim().is_empty())
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
