//! End-of-run console report

use crate::stats::{EndpointSummary, RunSummary};
use std::io::{self, Write};

const MAX_FAILURE_LINES: usize = 10;

fn table_header() -> String {
    format!(
        "   {:<34} {:>8} {:>7} {:>7} {:>7} {:>7} {:>7} {:>7} {:>8}",
        "Name", "Reqs", "Fails", "Avg", "P50", "P95", "P99", "Max", "Req/s"
    )
}

fn table_row(e: &EndpointSummary) -> String {
    format!(
        "   {:<34} {:>8} {:>7} {:>7.2} {:>7.2} {:>7.2} {:>7.2} {:>7.2} {:>8.2}",
        e.name, e.requests, e.failures, e.avg_ms, e.p50_ms, e.p95_ms, e.p99_ms, e.max_ms,
        e.requests_per_second
    )
}

/// Render the final report as lines
pub fn format_final_report(summary: &RunSummary) -> Vec<String> {
    let mut lines = Vec::new();
    let secs = summary.duration.as_secs();

    lines.push(String::new());
    lines.push("╔════════════════════════════════════════════════════════════════╗".to_string());
    lines.push("║                    FINAL TEST REPORT                           ║".to_string());
    lines.push("╚════════════════════════════════════════════════════════════════╝".to_string());
    lines.push(format!(
        "\n⏱️  Duration: {:02}:{:02}:{:02}",
        secs / 3600,
        (secs % 3600) / 60,
        secs % 60
    ));

    lines.push("\n📊 REQUESTS (times in ms)".to_string());
    lines.push(table_header());
    for endpoint in &summary.endpoints {
        lines.push(table_row(endpoint));
    }
    lines.push(table_row(&summary.total));

    if summary.total.requests > 0 {
        lines.push(format!(
            "\n   Failure Rate:         {:>10.2}%",
            summary.total.failure_rate() * 100.0
        ));
    }

    if !summary.total.failure_messages.is_empty() {
        lines.push("\n❌ FAILURES".to_string());
        for (message, count) in summary.total.failure_messages.iter().take(MAX_FAILURE_LINES) {
            lines.push(format!("   {:>8}  {}", count, message));
        }
        let hidden = summary
            .total
            .failure_messages
            .len()
            .saturating_sub(MAX_FAILURE_LINES);
        if hidden > 0 {
            lines.push(format!("   ... and {} more", hidden));
        }
    }

    lines
}

/// Print final summary report to stdout
pub fn print_final_report(summary: &RunSummary) {
    for line in format_final_report(summary) {
        println!("{}", line);
    }
    let _ = io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn endpoint(name: &str, requests: u64, failures: u64) -> EndpointSummary {
        EndpointSummary {
            name: name.to_string(),
            requests,
            failures,
            min_ms: 0.4,
            avg_ms: 4.5,
            p50_ms: 4.0,
            p95_ms: 9.25,
            p99_ms: 12.0,
            max_ms: 15.0,
            requests_per_second: 10.0,
            bytes: 100,
            failure_messages: Vec::new(),
        }
    }

    #[test]
    fn test_report_lists_every_endpoint_and_total() {
        let mut total = endpoint("Aggregated", 20, 2);
        total.failure_messages = vec![("FAIL_OPEN: E1".to_string(), 2)];
        let summary = RunSummary {
            endpoints: vec![
                endpoint("/v1/evaluate/auth", 14, 2),
                endpoint("/v1/evaluate/monitoring", 6, 0),
            ],
            total,
            duration: Duration::from_secs(75),
        };

        let report = format_final_report(&summary).join("\n");
        assert!(report.contains("00:01:15"));
        assert!(report.contains("/v1/evaluate/auth"));
        assert!(report.contains("/v1/evaluate/monitoring"));
        assert!(report.contains("Aggregated"));
        assert!(report.contains("10.00%"));
        assert!(report.contains("FAIL_OPEN: E1"));
        assert!(report.contains("9.25"));
    }

    #[test]
    fn test_report_without_requests_has_no_failure_section() {
        let summary = RunSummary {
            endpoints: vec![],
            total: endpoint("Aggregated", 0, 0),
            duration: Duration::ZERO,
        };

        let report = format_final_report(&summary).join("\n");
        assert!(!report.contains("FAILURES"));
        assert!(!report.contains("Failure Rate"));
    }
}
