//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;
use std::path::{Path, PathBuf};

/// Event Dispatch - fan events out to their recipients with backoff on rejection
#[derive(Parser, Debug)]
#[command(
    name = "event-dispatch",
    author,
    version,
    about = "Single-consumer event fan-out dispatcher",
    long_about = "Reads events one at a time, delivers each payload to every listed \n\
                  recipient in order, and pauses for a fixed backoff interval whenever \n\
                  a recipient rejects delivery. Stops on Ctrl+C, SIGTERM or --timeout."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "EVENT_DISPATCH_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "EVENT_DISPATCH_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Filter directive used when `RUST_LOG` does not override it
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "warn";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the dispatch loop until stopped
    Run(RunArgs),

    /// Validate an event file without dispatching
    Validate(ValidateArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// JSON-lines event file ("-" for stdin); a mock source is used when absent
    #[arg(short, long, env = "EVENT_DISPATCH_EVENTS")]
    pub events: Option<PathBuf>,

    /// Pause after every rejected delivery, in milliseconds
    #[arg(long, default_value = "5000", env = "EVENT_DISPATCH_BACKOFF_MS")]
    pub backoff_ms: u64,

    /// Delivery attempts per recipient (1 = back off and move on)
    #[arg(
        long,
        default_value = "1",
        value_parser = clap::value_parser!(u32).range(1..),
        env = "EVENT_DISPATCH_MAX_ATTEMPTS"
    )]
    pub max_attempts: u32,

    /// Interval between mock events, in milliseconds
    #[arg(long, default_value = "1000", env = "EVENT_DISPATCH_MOCK_INTERVAL_MS")]
    pub mock_interval_ms: u64,

    /// Delivery sink
    #[arg(long, value_enum, default_value = "mock", env = "EVENT_DISPATCH_SINK")]
    pub sink: SinkKind,

    /// Simulated latency of the mock sink, in milliseconds
    #[arg(long, default_value = "500", env = "EVENT_DISPATCH_SINK_LATENCY_MS")]
    pub sink_latency_ms: u64,

    /// Mock sink rejects every n-th delivery (0 = never)
    #[arg(long, default_value = "0", env = "EVENT_DISPATCH_REJECT_EVERY")]
    pub reject_every: u64,

    /// Stop after this many seconds (0 = run until interrupted)
    #[arg(long, default_value = "0", env = "EVENT_DISPATCH_TIMEOUT")]
    pub timeout: u64,
}

impl RunArgs {
    /// Where events come from
    pub fn input(&self) -> EventInput<'_> {
        match &self.events {
            Some(path) if path.as_os_str() == "-" => EventInput::Stdin,
            Some(path) => EventInput::File(path),
            None => EventInput::Mock,
        }
    }
}

/// Event input selected by `--events`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventInput<'a> {
    Stdin,
    File(&'a Path),
    Mock,
}

impl fmt::Display for EventInput<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventInput::Stdin => f.write_str("stdin"),
            EventInput::File(path) => write!(f, "{}", path.display()),
            EventInput::Mock => f.write_str("mock"),
        }
    }
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the JSON-lines event file
    #[arg(short, long)]
    pub events: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Delivery sink selection
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SinkKind {
    /// Log every delivery and accept it
    Log,
    /// Simulated latency and rejections
    #[default]
    Mock,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
