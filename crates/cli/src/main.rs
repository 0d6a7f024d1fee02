//! # Event Dispatch CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 事件源与投递目标的选择
//! - 分发循环的运行与优雅关闭
//! - 事件文件校验

mod cli;
mod commands;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::runtime::Runtime;
use tracing::{error, info};
use tracing_subscriber::Layer;

use cli::{Cli, Commands};
use commands::{run_dispatch, run_validate};

/// How long runtime shutdown waits for blocking-pool threads
///
/// A stdin read that never completes stays parked on one of them.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(500);

fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(&cli)?;

    let runtime = build_runtime()?;
    let result = runtime.block_on(execute(&cli));
    shutdown_runtime(runtime);

    if let Err(ref e) = result {
        error!(error = %e, "Command failed");
    }

    result
}

fn build_runtime() -> Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("event-dispatch")
        .build()
        .context("Failed to build tokio runtime")
}

fn shutdown_runtime(runtime: Runtime) {
    runtime.shutdown_timeout(SHUTDOWN_GRACE);
}

async fn execute(cli: &Cli) -> Result<()> {
    match &cli.command {
        Commands::Run(args) => {
            info!(
                version = env!("CARGO_PKG_VERSION"),
                source = %args.input(),
                sink = ?args.sink,
                backoff_ms = args.backoff_ms,
                max_attempts = args.max_attempts,
                timeout_secs = args.timeout,
                "Starting event dispatch"
            );
            run_dispatch(args).await
        }
        Commands::Validate(args) => {
            info!(
                version = env!("CARGO_PKG_VERSION"),
                events = %args.events.display(),
                "Starting event file validation"
            );
            run_validate(args)
        }
    }
}

/// Install the global subscriber; `RUST_LOG` wins unless `--quiet` is set
fn init_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let level = cli.log_level();
    let filter = if cli.quiet {
        EnvFilter::new(level)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
    };

    let fmt_layer = match cli.log_format {
        cli::LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_thread_names(true)
            .with_line_number(true)
            .boxed(),
        cli::LogFormat::Pretty => fmt::layer().pretty().boxed(),
        cli::LogFormat::Compact => fmt::layer().compact().with_target(false).boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .context("Failed to initialize logging")
}
