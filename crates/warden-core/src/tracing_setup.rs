use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Installs the process-wide tracing subscriber.
///
/// Defaults to WARN; `RUST_LOG` overrides per-target levels as usual.
pub fn init_tracing() {
    let env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
