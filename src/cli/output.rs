use colored::*;
use serde::Serialize;
use std::path::Path;

use crate::common::format::{format_count, format_duration, format_path, format_size};
use crate::sweep::SweepReport;

/// Print a sweep report in human-readable format
pub fn print_sweep_report(report: &SweepReport, dry_run: bool) {
    println!();
    println!(
        "  {} Swept {} — {} scanned in {}",
        "🧹",
        format_path(&report.root).cyan(),
        format_count(report.files_scanned),
        format_duration(report.duration_secs),
    );

    if report.matched.is_empty() {
        println!("  {} Nothing old enough to remove.", "✓".green());
    } else if dry_run {
        println!(
            "  {} {} would be removed:",
            "🔍",
            format_count(report.matched.len()).yellow(),
        );
        for path in &report.matched {
            println!("    {} {}", "•".dimmed(), format_path(path));
        }
    } else {
        println!(
            "  {} Removed {}",
            "🔥",
            format_count(report.deleted.len()).cyan(),
        );
        for path in &report.deleted {
            println!("    {} {}", "✗".red(), format_path(path));
        }
    }

    if !report.errors.is_empty() {
        println!();
        for err in &report.errors {
            println!("    {} {}", "⚠".yellow(), err.dimmed());
        }
    }
    println!();
}

/// Print a minimal summary: scanned, matched, deleted, errors
pub fn print_sweep_quiet(report: &SweepReport) {
    println!(
        "{}  {}  {}  {}",
        report.files_scanned,
        report.matched.len(),
        report.deleted.len(),
        report.errors.len()
    );
}

pub fn print_download(dest: &Path, bytes: u64) {
    println!(
        "  {} Downloaded {} to {}",
        "✓".green(),
        format_size(bytes),
        format_path(dest).cyan()
    );
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing results: {}", e),
    }
}
