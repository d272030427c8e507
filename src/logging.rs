use tracing_subscriber::{EnvFilter, fmt};

/// Installs the global tracing subscriber.
///
/// Honours `RUST_LOG` and falls back to `info`. Records emitted through the
/// `log` facade (actix-web's access logger) are routed into the same output.
/// Calling it more than once is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}
