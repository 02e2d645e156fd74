use serde::Serialize;
use std::io::Write as _;
use std::sync::Arc;

use searchbench_core::runner::{ProgressFn, ProgressUpdate, RunSummary, StatSummary};

use super::OutputFormatter;

pub(crate) const SCHEMA: &str = "searchbench.ndjson.v1";

pub(crate) struct JsonOutput;

impl OutputFormatter for JsonOutput {
    fn progress(&self) -> Option<ProgressFn> {
        Some(Arc::new(move |u| {
            let line = build_progress_line(&u);
            emit_json_line(&line);
        }))
    }

    fn print_summary(&self, summary: &RunSummary) -> anyhow::Result<()> {
        let line = build_summary_line(summary);
        emit_json_line(&line);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonProgressLine {
    pub schema: &'static str,
    pub kind: &'static str,
    pub tick: u64,
    pub elapsed_secs: f64,
    /// Position of the scenario in the run; labels may repeat.
    pub scenario_index: usize,
    pub scenario: String,
    pub planned: u64,
    pub enqueued: bool,
    pub requests_total: u64,
    pub conn_errors: u64,
    pub content_errors: u64,
    pub requests_per_sec: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonSummaryLine {
    pub schema: &'static str,
    pub kind: &'static str,
    pub elapsed_secs: f64,
    pub scenarios: Vec<JsonScenarioSummary>,
    pub totals: JsonTotals,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonScenarioSummary {
    pub scenario: String,
    pub planned: u64,
    pub requests_total: u64,
    pub conn_errors: u64,
    pub content_errors: u64,
    /// `None` when the enqueue phase never finished or took no measurable time.
    pub requests_per_sec: Option<f64>,
    /// Microseconds. `None` when no request succeeded.
    pub avg_latency_us: Option<f64>,
    pub elapsed_secs: Option<f64>,
}

#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JsonTotals {
    pub requests_total: u64,
    pub conn_errors: u64,
    pub content_errors: u64,
}

fn build_progress_line(u: &ProgressUpdate) -> JsonProgressLine {
    JsonProgressLine {
        schema: SCHEMA,
        kind: "progress",
        tick: u.tick,
        elapsed_secs: u.elapsed.as_secs_f64(),
        scenario_index: u.stat_id.index(),
        scenario: u.scenario.clone(),
        planned: u.planned,
        enqueued: u.enqueued,
        requests_total: u.requests_total,
        conn_errors: u.conn_errors,
        content_errors: u.content_errors,
        requests_per_sec: if u.rps_now.is_finite() { u.rps_now } else { 0.0 },
    }
}

fn build_summary_line(summary: &RunSummary) -> JsonSummaryLine {
    let mut totals = JsonTotals::default();
    let scenarios = summary
        .scenarios
        .iter()
        .map(|s| {
            totals.requests_total = totals.requests_total.saturating_add(s.requests_total);
            totals.conn_errors = totals.conn_errors.saturating_add(s.conn_errors);
            totals.content_errors = totals.content_errors.saturating_add(s.content_errors);
            scenario_summary(s)
        })
        .collect::<Vec<_>>();

    JsonSummaryLine {
        schema: SCHEMA,
        kind: "summary",
        elapsed_secs: summary.elapsed.as_secs_f64(),
        scenarios,
        totals,
    }
}

fn scenario_summary(s: &StatSummary) -> JsonScenarioSummary {
    JsonScenarioSummary {
        scenario: s.scenario.clone(),
        planned: s.planned,
        requests_total: s.requests_total,
        conn_errors: s.conn_errors,
        content_errors: s.content_errors,
        requests_per_sec: s.rps(),
        avg_latency_us: s.avg_latency().map(|d| d.as_nanos() as f64 / 1e3),
        elapsed_secs: s.elapsed.map(|d| d.as_secs_f64()),
    }
}

fn emit_json_line<T: Serialize>(line: &T) {
    let mut out = std::io::stdout().lock();
    if serde_json::to_writer(&mut out, line).is_ok() {
        let _ = writeln!(out);
    }
}
