//! Output formatting utilities for CLI commands

use colored::Colorize;
use pixelbench_shared::utils::time::format_duration;
use pixelbench_shared::BenchmarkResult;

/// Print success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print warning message
pub fn warning(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Speedup as "2.50x"
fn speedup_text(result: &BenchmarkResult) -> String {
    if result.speedup.is_finite() {
        format!("{:.2}x", result.speedup)
    } else {
        "∞".to_string()
    }
}

/// Green when the bridge won, yellow when it lost, plain on a tie
fn color_by_winner(result: &BenchmarkResult, text: String) -> String {
    if result.bridge_faster() {
        text.green().to_string()
    } else if result.bridge_time > result.host_time {
        text.yellow().to_string()
    } else {
        text
    }
}

fn match_label(result: &BenchmarkResult) -> String {
    match result.outputs_match {
        Some(true) => "match".green().to_string(),
        Some(false) => "DIFFER".red().bold().to_string(),
        None => "-".dimmed().to_string(),
    }
}

/// Detailed lines for a single result
pub fn print_result(result: &BenchmarkResult) {
    println!("\n=== {} ({}x{}) ===", result.request, result.width, result.height);
    println!("  Host execution time:   {}", format_duration(result.host_time));
    println!(
        "  Bridge execution time: {} (incl. allocation & copy)",
        format_duration(result.bridge_time)
    );
    println!(
        "  Speedup:               {}",
        color_by_winner(result, speedup_text(result))
    );
    println!("  Outputs:               {}", match_label(result));
}

/// One row per result
pub fn print_table(results: &[BenchmarkResult]) {
    println!(
        "\n  {:<24} {:>12} {:>12} {:>9}  {}",
        "FILTER", "HOST", "BRIDGE", "SPEEDUP", "OUTPUT"
    );
    for result in results {
        // pad before coloring so escape codes do not skew the columns
        let speedup = format!("{:>9}", speedup_text(result));
        println!(
            "  {:<24} {:>12} {:>12} {}  {}",
            result.request.to_string(),
            format_duration(result.host_time),
            format_duration(result.bridge_time),
            color_by_winner(result, speedup),
            match_label(result)
        );
    }
}
