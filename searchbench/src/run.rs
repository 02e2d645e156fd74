use searchbench_core::runner::{BenchConfig, run_bench};

use crate::cli::RunArgs;
use crate::exit_codes::ExitCode;
use crate::output;
use crate::run_error::RunError;
use crate::scenario_file::{self, ScenarioOverrides};

/// Resolve scenarios, run the benchmark and print the report.
///
/// Request failures are part of the report; the run still exits with `Success`.
pub async fn run(args: RunArgs) -> Result<ExitCode, RunError> {
    let out = output::formatter(args.output);

    let cfg = bench_config(&args).await.map_err(RunError::InvalidInput)?;

    tracing::debug!(datadir = %args.datadir.display(), "data directory is not used by the load client");

    let progress = if args.quiet { None } else { out.progress() };
    let summary = run_bench(cfg, progress)
        .await
        .map_err(RunError::from_bench)?;

    out.print_summary(&summary)
        .map_err(RunError::RuntimeError)?;

    Ok(ExitCode::Success)
}

async fn bench_config(args: &RunArgs) -> anyhow::Result<BenchConfig> {
    let file = match &args.scenarios {
        Some(path) => Some(scenario_file::load(path).await?),
        None => None,
    };

    let overrides = ScenarioOverrides {
        requests: args.requests,
        validate_content: args.validate_content,
    };

    let mut cfg = BenchConfig::new(args.host.clone());
    cfg.workers = args.conn;
    cfg.queue_capacity = args.queue_capacity;
    cfg.timeout = args.timeout;
    cfg.scenarios = scenario_file::resolve(file.as_ref(), overrides)?;
    Ok(cfg)
}
