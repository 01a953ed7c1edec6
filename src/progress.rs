//! Progress display module
//!
//! Styled status lines, the row-scan progress bar and the end-of-run summary.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::pipeline::RunReport;

/// Print the application banner
pub fn print_banner() {
    let banner = r#"
╔══════════════════════════════════════════════════════════════╗
║                      CSV-TARGET-FILTER                       ║
║        Select table rows matching a list of target strings   ║
╚══════════════════════════════════════════════════════════════╝
"#;

    println!("{}", banner.green());
}

/// Print a section header
pub fn print_header(text: &str) {
    println!("\n{} {}", "▶".green(), text.green().bold());
}

/// Print an info message
pub fn print_info(text: &str) {
    println!("  {} {}", "ℹ".cyan(), text);
}

/// Print a success message
pub fn print_success(text: &str) {
    println!("  {} {}", "✔".green(), text.green());
}

/// Print a warning message
pub fn print_warning(text: &str) {
    println!("  {} {}", "⚠".yellow(), text.yellow());
}

/// Print an error message
pub fn print_error(text: &str) {
    eprintln!("  {} {}", "✖".red(), text.red());
}

/// Print a bullet point
pub fn print_bullet(text: &str) {
    println!("  {} {}", "•".green(), text);
}

/// Create a styled progress bar
pub fn create_progress_bar(total: u64, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(total);

    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.green/dim}] {pos}/{len} ({percent}%) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░"),
    );

    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));

    pb
}

/// Print final statistics
pub fn print_summary(report: &RunReport) {
    println!();
    println!("{}", "═".repeat(60).green());
    println!("{}", "                    FILTERING COMPLETE".green().bold());
    println!("{}", "═".repeat(60).green());
    println!();

    println!("  {} {}", "Targets:        ".green(), format_number(report.target_count as u64));
    println!("  {} {}", "Rows scanned:   ".green(), format_number(report.rows_scanned as u64));
    println!(
        "  {} {}",
        "Rows matched:   ".green().bold(),
        format_number(report.rows_matched as u64).green().bold()
    );
    println!("  {} {}", "Encoding:       ".green(), report.encoding);
    println!("  {} {}", "Output:         ".green(), report.output_path.display());
    println!();
    println!("  {} {}", "Duration:       ".green(), format_duration(report.elapsed));
    println!();
    println!("{}", "═".repeat(60).green());
}

/// Format a number with thousand separators
fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    let chars: Vec<char> = s.chars().collect();

    for (i, c) in chars.iter().enumerate() {
        if i > 0 && (chars.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(*c);
    }

    result
}

/// Format duration as human-readable string
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();

    if secs < 60 {
        format!("{:.1}s", duration.as_secs_f64())
    } else if secs < 3600 {
        let mins = secs / 60;
        let secs = secs % 60;
        format!("{}m {}s", mins, secs)
    } else {
        let hours = secs / 3600;
        let mins = (secs % 3600) / 60;
        format!("{}h {}m", hours, mins)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(123), "123");
        assert_eq!(format_number(1234), "1,234");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(30)), "30.0s");
        assert_eq!(format_duration(Duration::from_secs(90)), "1m 30s");
        assert_eq!(format_duration(Duration::from_secs(3661)), "1h 1m");
    }
}
