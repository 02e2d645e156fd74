use std::time::Duration;

pub(crate) const NOT_AVAILABLE: &str = "n/a";

/// Whole units per second, truncated toward zero.
pub(crate) fn format_rate(v: f64) -> String {
    if v.is_finite() {
        format!("{:.0}", v.trunc())
    } else {
        "0".to_string()
    }
}

/// Requests per second as a whole number, or `n/a` when the rate is unknown.
pub(crate) fn format_rps(rps: Option<f64>) -> String {
    rps.map_or_else(|| NOT_AVAILABLE.to_string(), format_rate)
}

/// Latency with two decimals in the largest unit (s, ms, us) that keeps it >= 1.
pub(crate) fn format_latency(d: Option<Duration>) -> String {
    let Some(d) = d else {
        return NOT_AVAILABLE.to_string();
    };

    let secs = d.as_secs_f64();
    if secs >= 1.0 {
        format!("{secs:.2}s")
    } else if secs >= 1e-3 {
        format!("{:.2}ms", secs * 1e3)
    } else {
        format!("{:.2}us", secs * 1e6)
    }
}
