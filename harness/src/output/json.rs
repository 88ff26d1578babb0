//! JSON output
//!
//! Writes benchmark reports in JSON format for further analysis

use anyhow::{Context, Result};
use pixelbench_shared::BenchmarkReport;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

/// Write `report` to `output_path` as pretty-printed JSON
pub fn write_report(report: &BenchmarkReport, output_path: &Path) -> Result<()> {
    info!("Writing JSON report: {}", output_path.display());

    let file = File::create(output_path)
        .with_context(|| format!("Failed to create output file: {}", output_path.display()))?;

    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, report)
        .context("Failed to serialize report to JSON")?;
    writer.flush().context("Failed to flush JSON report")?;

    info!("JSON report written to {}", output_path.display());

    Ok(())
}
