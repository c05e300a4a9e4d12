//! Start banner and final summary output.

use anyhow::Result;
use chrono::{DateTime, Local};
use cop2dted::{CoverageArea, RunSummary};
use serde::Serialize;
use std::path::Path;

#[derive(Serialize)]
struct SummaryReport<'a> {
    lat_min: i32,
    lat_max: i32,
    lon_min: i32,
    lon_max: i32,
    output: &'a str,
    success: u64,
    fail: u64,
    fetch_failed: u64,
    convert_failed: u64,
    elapsed_ms: u64,
}

/// Lines printed before the first tile is processed.
pub fn banner(started: DateTime<Local>, area: &CoverageArea, output: &Path) -> String {
    format!(
        "--- Process Started at {} ---\nCoverage: {}\nTarget directory: {}",
        started.format("%Y-%m-%d %H:%M:%S"),
        area,
        output.display()
    )
}

/// The closing summary line.
pub fn summary_line(summary: &RunSummary) -> String {
    let (success, fail) = summary.counts();
    format!("--- Process Complete. Success: {}, Fail: {} ---", success, fail)
}

/// Print the final summary, as text or as a single JSON object.
pub fn print_summary(
    summary: &RunSummary,
    area: &CoverageArea,
    output: &Path,
    json: bool,
) -> Result<()> {
    if json {
        let output = output.to_string_lossy();
        let report = SummaryReport {
            lat_min: area.lat_min,
            lat_max: area.lat_max,
            lon_min: area.lon_min,
            lon_max: area.lon_max,
            output: &output,
            success: summary.succeeded,
            fail: summary.failed(),
            fetch_failed: summary.fetch_failed,
            convert_failed: summary.convert_failed,
            elapsed_ms: summary.elapsed_ms,
        };
        println!("{}", serde_json::to_string(&report)?);
    } else {
        if summary.failed() > 0 {
            tracing::info!(
                fetch_failed = summary.fetch_failed,
                convert_failed = summary.convert_failed,
                "Failure breakdown"
            );
        }
        println!("\n{}", summary_line(summary));
    }
    Ok(())
}
