mod config;
mod error;
mod fetch;
mod model;
mod poller;
mod render;
mod report;
mod trigger;

use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info};

use config::{ApiConfig, CliArgs, Command};
use fetch::Fetcher;
use poller::RunTracker;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "runwatch=info".into()),
        )
        .init();

    let args = CliArgs::parse();
    info!("Starting runwatch v{}", env!("CARGO_PKG_VERSION"));

    let api = ApiConfig::from_args(&args);
    info!("Using endpoint {}", api.base_url);

    let Command::Run { headless_id } = args.command;

    tokio::select! {
        result = watch_run(&api, &headless_id) => match result {
            Ok(exit_code) => std::process::exit(exit_code),
            Err(err) => {
                error!("{:#}", err);
                std::process::exit(1);
            }
        },
        _ = tokio::signal::ctrl_c() => {
            // Trackers are abandoned mid-connection; nothing to drain.
            error!("Interrupted, abandoning run tracking");
            std::process::exit(1);
        }
    }
}

/// Trigger the run definition, watch every created instance to completion
/// and print the per-instance reports. Returns the process exit code:
/// 0 when every test of every instance passed, 1 otherwise.
async fn watch_run(api: &ApiConfig, run_def_id: &str) -> anyhow::Result<i32> {
    let fetcher = Fetcher::new()?;
    let instance_ids = trigger::trigger_run(&fetcher, api, run_def_id).await?;

    println!();

    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            println!("{}", render::progress_line(&event));
        }
    });

    let tracker = RunTracker::new(fetcher, api.clone());
    let tracked = poller::track_all(tracker, instance_ids, events_tx).await;

    // All senders are gone once track_all returns; the printer drains the
    // channel and ends before the report is printed.
    let _ = printer.await;

    let runs = tracked?;
    let now_ms = chrono::Utc::now().timestamp_millis();
    let mut all_passed = true;

    for run in &runs {
        let rows = report::build_report(run, now_ms);
        if !rows.iter().all(|row| row.passed()) {
            all_passed = false;
        }
        println!();
        println!("{}", render::run_report(run, &rows, api));
    }

    println!();
    if all_passed {
        println!("All tests passed, exiting with status 0");
        Ok(0)
    } else {
        println!("Some test failed, exiting with status 1");
        Ok(1)
    }
}
