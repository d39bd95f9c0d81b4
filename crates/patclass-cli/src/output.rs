//! Output formatting utilities

use colored::Colorize;
use patclass::metrics::MetricsReport;
use serde::Serialize;

/// Print a section header
pub(crate) fn section(title: &str) {
    println!("\n{}", format!("=== {title} ===").cyan().bold());
}

/// Print a key-value pair
pub(crate) fn kv(key: &str, value: impl std::fmt::Display) {
    println!("  {}: {}", key.white().bold(), value);
}

/// Print a warning message
pub(crate) fn warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// Print the four scores, colored by how good they are
pub(crate) fn metrics(report: &MetricsReport) {
    for (name, score) in [
        ("accuracy", report.accuracy),
        ("precision", report.precision),
        ("recall", report.recall),
        ("f1", report.f1),
    ] {
        let text = format!("{score:.4}");
        let colored = if score >= 0.8 {
            text.green()
        } else if score >= 0.5 {
            text.yellow()
        } else {
            text.red()
        };
        kv(name, colored);
    }
}

/// Print a value as pretty JSON on stdout
pub(crate) fn json<T: Serialize>(value: &T) -> crate::error::Result<()> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| crate::error::CliError::Patclass(e.to_string()))?;
    println!("{text}");
    Ok(())
}
