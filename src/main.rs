//! Newsletter dashboard binary entrypoint.
//! Boots the Axum HTTP server: config, shared state, routes, metrics.

use shuttle_axum::ShuttleAxum;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use newsletter_desk::{api, metrics::Metrics, AppState, DashboardConfig};

/// Enable compact tracing logs in development only.
/// Activation requires BOTH:
///   - dev environment (debug build OR SHUTTLE_ENV in {local, development, dev})
///   - NEWSLETTER_DEV_LOG=1
fn enable_dev_tracing() {
    let dev_flag = std::env::var("NEWSLETTER_DEV_LOG")
        .ok()
        .is_some_and(|v| v == "1");

    let is_dev_env = cfg!(debug_assertions)
        || matches!(
            std::env::var("SHUTTLE_ENV")
                .unwrap_or_default()
                .to_ascii_lowercase()
                .as_str(),
            "local" | "development" | "dev"
        );

    if !(dev_flag && is_dev_env) {
        return;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("artifacts=debug,view=debug,runner=info,warn"));

    // Shuttle may already have installed a subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .try_init();
}

#[shuttle_runtime::main]
async fn axum() -> ShuttleAxum {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    enable_dev_tracing();

    let cfg = DashboardConfig::load()?;
    info!(
        results_dir = %cfg.artifacts.results_dir.display(),
        runner = %cfg.runner.program,
        "dashboard config loaded"
    );

    let state = AppState::from_config(&cfg);
    let mut router = api::router(state);

    match Metrics::init() {
        Ok(m) => router = router.merge(m.router()),
        Err(e) => warn!("metrics disabled: {e:#}"),
    }

    Ok(router.into())
}
