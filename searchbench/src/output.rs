use crate::cli::OutputFormat;

use searchbench_core::runner::{ProgressFn, RunSummary};

mod human;
mod json;

pub(crate) trait OutputFormatter: Send + Sync {
    /// Callback for live progress. `quiet` runs never install it.
    fn progress(&self) -> Option<ProgressFn>;
    fn print_summary(&self, summary: &RunSummary) -> anyhow::Result<()>;
}

pub(crate) fn formatter(format: OutputFormat) -> Box<dyn OutputFormatter> {
    match format {
        OutputFormat::HumanReadable => Box::new(human::HumanReadableOutput::new()),
        OutputFormat::Json => Box::new(json::JsonOutput),
    }
}
