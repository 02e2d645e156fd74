use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use searchbench_core::runner::{DEFAULT_QUEUE_CAPACITY, DEFAULT_WORKERS};

fn parse_duration(input: &str) -> Result<Duration, String> {
    let s = input.trim();
    if s.is_empty() {
        return Err("duration cannot be empty (expected e.g. 10, 10s, 250ms, 1m)".to_string());
    }

    let number_end = s
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map_or(s.len(), |(idx, _)| idx);

    if number_end == 0 {
        return Err(format!(
            "invalid duration '{s}' (expected e.g. 10, 10s, 250ms, 1m)"
        ));
    }

    let (number_str, unit_str) = s.split_at(number_end);
    let value: u64 = number_str
        .parse()
        .map_err(|_| format!("invalid duration '{s}' (expected e.g. 10, 10s, 250ms, 1m)"))?;

    let d = match unit_str.trim() {
        "" | "s" | "sec" | "secs" | "second" | "seconds" => Duration::from_secs(value),
        "ms" | "msec" | "msecs" | "millisecond" | "milliseconds" => Duration::from_millis(value),
        "m" | "min" | "mins" | "minute" | "minutes" => {
            let secs = value
                .checked_mul(60)
                .ok_or_else(|| format!("duration '{s}' is too large"))?;
            Duration::from_secs(secs)
        }
        _ => {
            return Err(format!(
                "invalid duration '{s}' (expected e.g. 10, 10s, 250ms, 1m)"
            ));
        }
    };

    if d.is_zero() {
        return Err("duration must be greater than zero".to_string());
    }
    Ok(d)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Fixed-width summary table on stdout, progress bars on stderr.
    HumanReadable,
    /// NDJSON progress and summary lines on stdout.
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "searchbench",
    version,
    about = "Closed-loop HTTP load generator for search API endpoints",
    long_about = "searchbench drives a fixed number of GET requests per scenario through a bounded job queue and a pool of concurrent workers, then prints per-scenario throughput, average latency and error counts.\n\nWithout --scenarios the media_items, search and epg endpoints are benchmarked in that order.",
    after_help = "Examples:\n  searchbench run --host 127.0.0.1:8080\n  searchbench run --host https://search.example.com --conn 16 --requests 5000\n  searchbench run --scenarios scenarios.yaml --output json"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Benchmark the target host
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Target `host:port`, or a base URL with an explicit http:// or https:// scheme
    #[arg(long, env = "SEARCHBENCH_HOST", default_value = "127.0.0.1:8080")]
    pub host: String,

    /// Number of concurrent workers
    #[arg(long = "conn", default_value_t = DEFAULT_WORKERS)]
    pub conn: usize,

    /// Per-request timeout (e.g. 10, 10s, 250ms, 1m; bare numbers are seconds)
    #[arg(long, value_parser = parse_duration, default_value = "10s")]
    pub timeout: Duration,

    /// Data directory. Accepted for compatibility with existing invocations; not read.
    #[arg(long, default_value = "./data")]
    pub datadir: PathBuf,

    /// Override the request count of every scenario
    #[arg(long)]
    pub requests: Option<u64>,

    /// Bounded job queue capacity
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    pub queue_capacity: usize,

    /// YAML scenario file (replaces the built-in endpoint list)
    #[arg(long, value_name = "FILE")]
    pub scenarios: Option<PathBuf>,

    /// Validate search response envelopes and count content errors
    #[arg(long)]
    pub validate_content: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::HumanReadable)]
    pub output: OutputFormat,

    /// Disable live progress reporting
    #[arg(long, short)]
    pub quiet: bool,
}
