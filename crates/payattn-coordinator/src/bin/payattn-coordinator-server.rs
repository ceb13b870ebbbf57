//! Coordinator service entrypoint (spec.md §4.2). Loads configuration,
//! bootstraps the shared `AppState`, and serves the Axum router. Grounded
//! on `percmarket-percolator-CLI-excefy/cli/src/main.rs`'s
//! env-then-bootstrap-then-run shape, adapted from a CLI dispatcher to a
//! long-lived HTTP service per spec.md §6's "Configuration errors are
//! fatal at process start" requirement.

use payattn_coordinator::{bootstrap, routes::router, Config};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env().unwrap_or_else(|err| {
        tracing::error!(error = %err, "fatal configuration error");
        std::process::exit(1);
    });
    let bind_addr = config.bind_addr.clone();

    let state = bootstrap(config).await.unwrap_or_else(|err| {
        tracing::error!(error = %err, "failed to bootstrap coordinator state");
        std::process::exit(1);
    });

    let app = router(state);

    tracing::info!(%bind_addr, "coordinator listening");
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|err| {
            tracing::error!(error = %err, %bind_addr, "failed to bind listener");
            std::process::exit(1);
        });

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!(error = %err, "coordinator server exited with error");
        std::process::exit(1);
    }
}
