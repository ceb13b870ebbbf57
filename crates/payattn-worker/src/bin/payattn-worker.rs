//! Retry worker binary entrypoint (spec.md §4.4 "periodic tick driven by an
//! external scheduler; reentrancy-safe"). Grounded on
//! `percmarket-percolator-CLI-excefy/cli/src/keeper.rs::run_keeper`'s
//! `tokio::time::interval`-driven loop, adapted from a colored-CLI status
//! printer to structured `tracing` logging per the ambient stack.

use payattn_worker::{bootstrap, WorkerConfig};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = WorkerConfig::from_env().unwrap_or_else(|err| {
        tracing::error!(error = %err, "fatal configuration error");
        std::process::exit(1);
    });
    let retry_interval = config.retry_interval;

    let worker = bootstrap(config).await.unwrap_or_else(|err| {
        tracing::error!(error = %err, "failed to bootstrap retry worker");
        std::process::exit(1);
    });

    tracing::info!(interval_secs = retry_interval.as_secs(), "retry worker starting");

    let mut ticker = tokio::time::interval(retry_interval);
    // The first tick fires immediately; that's desirable here (drain
    // whatever's already queued at startup rather than waiting a full
    // interval).
    loop {
        ticker.tick().await;
        let report = worker.run_tick().await;
        if report.attempted > 0 {
            tracing::info!(
                attempted = report.attempted,
                succeeded = report.succeeded,
                failed = report.failed,
                gave_up = report.gave_up,
                "retry worker tick complete"
            );
        }
    }
}
