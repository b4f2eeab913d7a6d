/// Centralized tracing setup. Call once at startup.
///
/// - `RUST_LOG` controls verbosity (defaults to `info`)
/// - uptime timestamps show how long each poll and checkout takes
/// - compact output keeps span fields on one line
///
/// ```bash
/// RUST_LOG=debug cargo run
/// RUST_LOG=autochef_client::tracker_actor=debug,info cargo run
/// ```
pub fn setup_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .init();
}
