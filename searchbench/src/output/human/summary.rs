use std::fmt::Write as _;

use searchbench_core::runner::{RunSummary, StatSummary};

use super::format::{format_latency, format_rps};

const HEADERS: [&str; 6] = [
    "Method",
    "Requests",
    "RPS",
    "Avg Latency",
    "Socket errors",
    "Content errors",
];

pub(crate) fn render(summary: &RunSummary) -> String {
    let mut out = String::new();

    push_row(&mut out, HEADERS);
    let underline = HEADERS.map(|h| "-".repeat(h.len()));
    push_row(&mut out, underline.each_ref().map(String::as_str));

    for s in &summary.scenarios {
        render_scenario(s, &mut out);
    }

    out
}

fn render_scenario(s: &StatSummary, out: &mut String) {
    let requests = s.requests_total.to_string();
    let rps = format_rps(s.rps());
    let latency = format_latency(s.avg_latency());
    let conn_errors = s.conn_errors.to_string();
    let content_errors = s.content_errors.to_string();

    push_row(
        out,
        [
            &s.scenario,
            &requests,
            &rps,
            &latency,
            &conn_errors,
            &content_errors,
        ],
    );
}

fn push_row(out: &mut String, [method, requests, rps, latency, conn, content]: [&str; 6]) {
    writeln!(
        out,
        " {method:<30}{requests:>10}{rps:>10}{latency:>16}{conn:>16}{content:>16}"
    )
    .ok();
}
