use std::sync::Arc;

mod format;
mod progress;
mod summary;

use format::format_rate;
use progress::HumanProgress;
use summary::render;

use searchbench_core::runner::{ProgressFn, RunSummary};

use super::OutputFormatter;

pub(crate) struct HumanReadableOutput {
    progress: Arc<HumanProgress>,
}

impl HumanReadableOutput {
    pub(crate) fn new() -> Self {
        Self {
            progress: Arc::new(HumanProgress::new()),
        }
    }
}

impl OutputFormatter for HumanReadableOutput {
    fn progress(&self) -> Option<ProgressFn> {
        let progress = self.progress.clone();

        Some(Arc::new(move |u| {
            let state = if u.enqueued { "draining" } else { "enqueueing" };
            let message = format!(
                "{state} rps={} socket_errors={} content_errors={}",
                format_rate(u.rps_now),
                u.conn_errors,
                u.content_errors
            );
            progress.update(u.stat_id, &u.scenario, u.planned, u.requests_total, message);
        }))
    }

    fn print_summary(&self, summary: &RunSummary) -> anyhow::Result<()> {
        self.progress.finish();
        print!("{}", render(summary));
        Ok(())
    }
}
