//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use contracts::{DeliverySink, EventSource};
use dispatcher::{
    CancellationToken, DispatchStats, Dispatcher, DispatcherConfig, JsonLinesSource, LogSink,
    MockSink, MockSource,
};

use crate::cli::{EventInput, RunArgs, SinkKind};

/// Execute the `run` command
pub async fn run_dispatch(args: &RunArgs) -> Result<()> {
    let config = DispatcherConfig {
        backoff: Duration::from_millis(args.backoff_ms),
        max_attempts: args.max_attempts,
    };

    let cancel = CancellationToken::new();
    spawn_stop_trigger(cancel.clone(), args.timeout);

    let stats = match args.input() {
        EventInput::Stdin => {
            // The pending read keeps a blocking thread busy after cancel;
            // main bounds runtime shutdown so the process still exits.
            info!("Reading events from stdin");
            with_sink(JsonLinesSource::stdin(), args, config, &cancel).await?
        }
        EventInput::File(path) => {
            info!(events = %path.display(), "Reading events from file");
            let source = JsonLinesSource::open(path)
                .await
                .with_context(|| format!("Failed to open event file {}", path.display()))?;
            with_sink(source, args, config, &cancel).await?
        }
        EventInput::Mock => {
            info!(
                interval_ms = args.mock_interval_ms,
                "No event file given, using mock source"
            );
            let source =
                MockSource::demo().with_interval(Duration::from_millis(args.mock_interval_ms));
            with_sink(source, args, config, &cancel).await?
        }
    };

    print_summary(&stats);
    info!("Event dispatch finished");
    Ok(())
}

async fn with_sink<S: EventSource>(
    source: S,
    args: &RunArgs,
    config: DispatcherConfig,
    cancel: &CancellationToken,
) -> Result<DispatchStats> {
    match args.sink {
        SinkKind::Log => drive(source, LogSink::new("log"), config, cancel).await,
        SinkKind::Mock => {
            let sink = MockSink::new("mock")
                .with_latency(Duration::from_millis(args.sink_latency_ms))
                .with_reject_every(args.reject_every);
            drive(source, sink, config, cancel).await
        }
    }
}

async fn drive<S: EventSource, K: DeliverySink>(
    source: S,
    sink: K,
    config: DispatcherConfig,
    cancel: &CancellationToken,
) -> Result<DispatchStats> {
    let mut dispatcher =
        Dispatcher::with_config(source, sink, config).context("Invalid dispatcher settings")?;
    dispatcher.run(cancel).await;
    Ok(dispatcher.stats())
}

/// Cancel on Ctrl+C, SIGTERM or after `timeout_secs` (0 = never)
fn spawn_stop_trigger(cancel: CancellationToken, timeout_secs: u64) {
    tokio::spawn(async move {
        let timeout = async {
            if timeout_secs == 0 {
                std::future::pending::<()>().await;
            }
            tokio::time::sleep(Duration::from_secs(timeout_secs)).await;
        };

        tokio::select! {
            _ = shutdown_signal() => warn!("Received shutdown signal, stopping dispatcher..."),
            _ = timeout => info!(timeout_secs, "Timeout reached, stopping dispatcher..."),
        }
        cancel.cancel();
    });
}

/// Resolve on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

fn print_summary(stats: &DispatchStats) {
    println!("\n=== Dispatch Summary ===\n");
    println!("  Events:        {}", stats.cycles);
    println!("  Deliveries:    {}", stats.deliveries);
    println!("  Accepted:      {}", stats.accepted);
    println!("  Rejected:      {}", stats.rejected);
    println!("  Backoffs:      {}", stats.backoffs);
    if stats.source_faults > 0 || stats.sink_faults > 0 {
        println!("  Source faults: {}", stats.source_faults);
        println!("  Sink faults:   {}", stats.sink_faults);
    }
    println!();
}
