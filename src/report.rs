//! Output formatting for codemap results.
//!
//! Supports two output formats for statistics:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use colored::*;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::metadata::display_path;
use crate::processor::{RunSummary, Stats};

/// Label used for files without an extension.
const NO_EXTENSION: &str = "(no extension)";

/// JSON statistics report.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonStats {
    pub directory: String,
    pub total_files: usize,
    pub annotated_files: usize,
    pub unannotated_files: usize,
    pub files_by_language: Vec<LanguageCount>,
}

/// Per-extension entry in the JSON report.
#[derive(Debug, Serialize, Deserialize)]
pub struct LanguageCount {
    pub extension: String,
    pub files: usize,
}

/// Build the JSON report. Entries are sorted by count, then extension.
pub fn stats_to_json(directory: &str, stats: &Stats) -> JsonStats {
    JsonStats {
        directory: directory.to_string(),
        total_files: stats.total_files,
        annotated_files: stats.annotated_files,
        unannotated_files: stats.unannotated_files,
        files_by_language: sorted_breakdown(stats)
            .into_iter()
            .map(|(ext, files)| LanguageCount {
                extension: ext.to_string(),
                files,
            })
            .collect(),
    }
}

/// Write statistics in JSON format.
pub fn write_stats_json(directory: &str, stats: &Stats) -> anyhow::Result<()> {
    let report = stats_to_json(directory, stats);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Write statistics with colored output.
pub fn write_stats_pretty(directory: &str, stats: &Stats) {
    println!();
    println!("  {} {}", "Statistics for".bold(), directory.blue());
    println!();
    println!("    {:<28}{}", "Total files:", stats.total_files);
    println!(
        "    {:<28}{}",
        "Files with annotations:",
        stats.annotated_files.to_string().green()
    );

    let missing = stats.unannotated_files.to_string();
    if stats.unannotated_files == 0 {
        println!("    {:<28}{}", "Files without annotations:", missing.green());
    } else {
        println!("    {:<28}{}", "Files without annotations:", missing.yellow());
    }

    if !stats.files_by_language.is_empty() {
        println!();
        println!("  {}", "Breakdown by language:".bold());
        for (ext, count) in sorted_breakdown(stats) {
            let label = if ext.is_empty() { NO_EXTENSION } else { ext };
            let plural = if count != 1 { "s" } else { "" };
            println!("    {:<20} {:>5} file{}", label, count, plural);
        }
    }

    println!();
    write_coverage(stats);
    println!();
}

fn write_coverage(stats: &Stats) {
    let pct = coverage_percent(stats);
    let text = format!("{pct}% annotated");
    match pct {
        100 => println!("  {}", text.green().bold()),
        p if p >= 50 => println!("  {}", text.yellow()),
        _ => println!("  {}", text.red()),
    }
}

/// Share of annotated files, rounded down. An empty tree counts as fully
/// annotated.
pub fn coverage_percent(stats: &Stats) -> usize {
    if stats.total_files == 0 {
        return 100;
    }
    stats.annotated_files * 100 / stats.total_files
}

fn sorted_breakdown(stats: &Stats) -> Vec<(&str, usize)> {
    let mut entries: Vec<(&str, usize)> = stats
        .files_by_language
        .iter()
        .map(|(ext, count)| (ext.as_str(), *count))
        .collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    entries
}

/// Print candidate files relative to `root`.
pub fn write_file_list(directory: &str, root: &Path, files: &[PathBuf]) {
    println!("Found {} files in {}:", files.len(), directory);
    for file in files {
        println!("{}", display_path(root, file));
    }
}

/// Print what a dry run would touch.
pub fn write_dry_run(verb: &str, directory: &str, root: &Path, files: &[PathBuf]) {
    println!(
        "{} {} files in {}",
        format!("Would {verb}").dimmed(),
        files.len(),
        directory
    );
    for file in files {
        println!("  {} {}", format!("would {verb}:").dimmed(), display_path(root, file));
    }
}

/// Print the result of an apply or clean run.
pub fn write_summary(action: &str, summary: &RunSummary) {
    let status = if summary.failed == 0 {
        "✓".green()
    } else {
        "✗".red()
    };
    print!(
        "  {} {} {} of {} files",
        status,
        action,
        summary.changed.to_string().bold(),
        summary.total
    );

    let mut notes = Vec::new();
    if summary.unchanged > 0 {
        notes.push(format!("{} unchanged", summary.unchanged));
    }
    if summary.unsupported > 0 {
        notes.push(format!("{} unsupported", summary.unsupported));
    }
    if summary.failed > 0 {
        notes.push(format!("{} failed", summary.failed));
    }
    if !notes.is_empty() {
        print!("  {}", format!("({})", notes.join(", ")).dimmed());
    }
    println!();
}
