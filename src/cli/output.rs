//! CLI output formatting.
//!
//! Reports are plain data so they can be printed as text or JSON and
//! checked in tests without capturing stdout.

use serde::Serialize;

use crate::demos::{DemoKind, DemoParams, Metric};
use crate::engine::{Lifecycle, StopReason, Vec2};

/// Outcome of a headless run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Demo that ran.
    pub demo: DemoKind,
    /// Final lifecycle phase.
    pub lifecycle: Lifecycle,
    /// Why the run ended, `None` if the time budget ran out first.
    pub stop_reason: Option<StopReason>,
    /// Simulated time at the end (s).
    pub elapsed: f64,
    /// Final state.
    pub state: serde_json::Value,
    /// Derived metrics of the final state.
    pub metrics: Vec<Metric>,
    /// Display scale the body positions were converted with.
    pub pixels_per_meter: f64,
    /// Final body positions in pixels (world axes, y up).
    pub bodies_px: Vec<Vec2>,
}

/// Format a run report as human-readable text.
#[must_use]
pub fn format_report(report: &RunReport) -> String {
    let outcome = report
        .stop_reason
        .map_or_else(|| "time budget exhausted".to_string(), |r| r.to_string());

    let mut out = String::new();
    out.push_str(&format!("{} ({})\n", report.demo.title(), report.demo));
    out.push_str(&format!("  outcome:   {outcome}\n"));
    out.push_str(&format!("  simulated: {:.3} s\n", report.elapsed));
    out.push_str(&format!("  scale:     {} px/m\n", report.pixels_per_meter));
    for (i, body) in report.bodies_px.iter().enumerate() {
        out.push_str(&format!("  body {i}:    ({:.1}, {:.1}) px\n", body.x, body.y));
    }
    out.push_str("  metrics:\n");
    for metric in &report.metrics {
        out.push_str(&format!(
            "    {:<20} {:>14.6} {}\n",
            metric.name, metric.value, metric.unit
        ));
    }
    out
}

/// Format the demo list, one line per demo.
#[must_use]
pub fn format_demo_list() -> String {
    let mut out = String::new();
    for kind in DemoKind::ALL {
        out.push_str(&format!("{:<16} {}\n", kind.as_str(), kind.title()));
    }
    out
}

/// Default parameters of every demo, for `list --json`.
#[must_use]
pub fn demo_defaults() -> Vec<DemoParams> {
    DemoKind::ALL.into_iter().map(DemoParams::defaults).collect()
}

/// Print a run report.
pub fn print_report(report: &RunReport) {
    print!("{}", format_report(report));
}

/// Print the demo list.
pub fn print_demo_list() {
    print!("{}", format_demo_list());
}
