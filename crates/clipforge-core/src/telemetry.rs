//! Tracing bootstrap for binaries and tests

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured logging with an env-filter.
///
/// Honors `RUST_LOG`; defaults to debug-level output for this workspace.
/// Safe to call once per process; later calls are ignored.
pub fn init_telemetry() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "clipforge=debug".into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init();
}
