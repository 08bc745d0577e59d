use httpload_common::Summary;
use httpload_engine::TestConfig;
use std::fmt::Write;

/// Render the end-of-run report as printed to stdout.
pub fn render(config: &TestConfig, summary: &Summary) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_report(&mut out, config, summary);
    out
}

fn write_report(out: &mut String, config: &TestConfig, summary: &Summary) -> std::fmt::Result {
    writeln!(out, "HTTP Load Test Results")?;
    writeln!(out, "======================")?;
    writeln!(out, "Target:                {}", config.url)?;
    writeln!(out, "Pattern:               {}", config.pattern.as_name())?;
    writeln!(out, "Duration:              {:.1} s", config.duration_secs)?;
    writeln!(out, "Concurrency:           {}", config.concurrency)?;
    writeln!(out)?;
    writeln!(out, "Total Requests:        {}", summary.total_requests)?;
    writeln!(out, "Errors:                {}", summary.error_count)?;
    writeln!(out, "Error Rate:            {:.2}%", summary.error_rate * 100.0)?;
    writeln!(out, "Achieved QPS:          {:.2}", summary.achieved_qps)?;

    if summary.total_requests > summary.error_count {
        let l = &summary.latency;
        writeln!(out)?;
        writeln!(out, "Latency Statistics (seconds):")?;
        writeln!(out, "  Min:     {:.4}", l.min)?;
        writeln!(out, "  Max:     {:.4}", l.max)?;
        writeln!(out, "  Mean:    {:.4}", l.mean)?;
        writeln!(out, "  Median:  {:.4}", l.median)?;
        writeln!(out, "  P90:     {:.4}", l.p90)?;
        writeln!(out, "  P95:     {:.4}", l.p95)?;
        writeln!(out, "  P99:     {:.4}", l.p99)?;
        writeln!(out, "  Std Dev: {:.4}", l.std_dev)?;
    }

    writeln!(out)?;
    writeln!(out, "Status Code Distribution:")?;
    if summary.status_codes.is_empty() {
        writeln!(out, "  (no responses)")?;
    }
    for (code, count) in &summary.status_codes {
        writeln!(out, "  {code}: {count}")?;
    }

    if !summary.error_breakdown.is_empty() {
        writeln!(out)?;
        writeln!(out, "Errors by Kind:")?;
        for (kind, count) in &summary.error_breakdown {
            writeln!(out, "  {}: {count}", kind.as_name())?;
        }
    }
    Ok(())
}
