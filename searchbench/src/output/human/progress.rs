use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use searchbench_core::runner::StatId;

/// One bar per scenario on stderr, sized by the scenario's planned request count.
///
/// Bars are keyed by [`StatId`] because scenario labels may repeat.
pub(crate) struct HumanProgress {
    inner: Mutex<Inner>,
}

impl HumanProgress {
    pub(crate) fn new() -> Self {
        let multi = MultiProgress::new();
        multi.set_draw_target(ProgressDrawTarget::stderr_with_hz(5));

        Self {
            inner: Mutex::new(Inner {
                multi,
                bars: HashMap::new(),
            }),
        }
    }

    pub(crate) fn update(
        &self,
        id: StatId,
        scenario: &str,
        planned: u64,
        completed: u64,
        message: String,
    ) {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let pb = inner.get_or_create_bar(id, scenario, planned);
        pb.set_message(message);
        pb.set_position(completed.min(planned));
    }

    pub(crate) fn finish(&self) {
        let mut inner = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        for (_, pb) in inner.bars.drain() {
            pb.finish_and_clear();
        }

        let _ = inner.multi.clear();
    }
}

struct Inner {
    multi: MultiProgress,
    bars: HashMap<StatId, ProgressBar>,
}

impl Inner {
    fn get_or_create_bar(&mut self, id: StatId, scenario: &str, planned: u64) -> &ProgressBar {
        self.bars.entry(id).or_insert_with(|| {
            let pb = self.multi.add(ProgressBar::new(planned));
            pb.set_style(bar_style());
            pb.set_prefix(scenario.to_string());
            pb.enable_steady_tick(Duration::from_millis(200));
            pb
        })
    }
}

fn bar_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:<30} [ {bar:20.cyan/blue} ] {pos:>7}/{len:7} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█░")
}
