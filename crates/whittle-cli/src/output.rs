//! Output formatting and reporting

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use similar::TextDiff;
use std::time::Duration;
use whittle_core::{Finding, ReduceStats, Result, Severity, WhittleError};

use crate::OutputFormat;

/// Summary statistics for a check run
#[derive(Debug, Clone, Default, Serialize)]
pub struct CheckSummary {
    pub files_checked: usize,
    pub errors: usize,
    pub warnings: usize,
    /// Files that could not be analyzed
    pub failed_files: usize,
}

impl CheckSummary {
    pub fn new(files_checked: usize, findings: &[Finding], failures: &[WhittleError]) -> Self {
        let errors = findings
            .iter()
            .filter(|f| f.severity == Severity::Error)
            .count();
        Self {
            files_checked,
            errors,
            warnings: findings.len() - errors,
            failed_files: failures.len(),
        }
    }

    pub fn total_issues(&self) -> usize {
        self.errors + self.warnings
    }

    pub fn has_issues(&self) -> bool {
        self.total_issues() > 0 || self.failed_files > 0
    }
}

#[derive(Serialize)]
struct NumberedFinding<'a> {
    number: usize,
    #[serde(flatten)]
    finding: &'a Finding,
}

/// Output formatter for check results
pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn print_check(
        &self,
        findings: &[Finding],
        failures: &[WhittleError],
        summary: &CheckSummary,
    ) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                print_human(findings, failures, summary);
                Ok(())
            }
            OutputFormat::Json => print_json(findings, failures, summary),
        }
    }
}

fn print_human(findings: &[Finding], failures: &[WhittleError], summary: &CheckSummary) {
    for (i, finding) in findings.iter().enumerate() {
        let severity = match finding.severity {
            Severity::Error => "error".red().bold(),
            Severity::Warning => "warning".yellow().bold(),
        };
        println!(
            "{:>3}. {}:{}:{}: {} [{}] {}",
            i + 1,
            finding.file.display(),
            finding.line,
            finding.column,
            severity,
            finding.rule_id.dimmed(),
            finding.message
        );
    }
    for failure in failures {
        println!("{} {}", "failed:".red().bold(), failure);
    }

    println!("\n{}", "Summary:".bold());
    println!("  Files checked: {}", summary.files_checked);
    if summary.has_issues() {
        if summary.errors > 0 {
            println!("  Errors: {}", summary.errors.to_string().red());
        }
        if summary.warnings > 0 {
            println!("  Warnings: {}", summary.warnings.to_string().yellow());
        }
        if summary.failed_files > 0 {
            println!("  Unreadable files: {}", summary.failed_files.to_string().red());
        }
    } else {
        println!("  {}", "No findings".green());
    }
}

fn print_json(findings: &[Finding], failures: &[WhittleError], summary: &CheckSummary) -> Result<()> {
    let numbered: Vec<NumberedFinding<'_>> = findings
        .iter()
        .enumerate()
        .map(|(i, finding)| NumberedFinding {
            number: i + 1,
            finding,
        })
        .collect();
    let result = serde_json::json!({
        "findings": numbered,
        "failures": failures.iter().map(ToString::to_string).collect::<Vec<_>>(),
        "summary": summary,
    });

    let text = serde_json::to_string_pretty(&result)
        .map_err(|e| WhittleError::internal_error(format!("Failed to serialize JSON: {e}")))?;
    println!("{text}");
    Ok(())
}

/// Unified diff between the merged input and the reduced text
pub fn print_diff(merged: &str, reduced: &str) {
    let diff = TextDiff::from_lines(merged, reduced);
    let unified = diff
        .unified_diff()
        .context_radius(3)
        .header("merged", "reduced")
        .to_string();
    for line in unified.lines() {
        if line.starts_with("---") || line.starts_with("+++") {
            println!("{}", line.bold());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else {
            println!("{line}");
        }
    }
}

pub fn print_stats(stats: &ReduceStats) {
    let saved = stats.initial_bytes.saturating_sub(stats.final_bytes);
    eprintln!("{}", "Reduction statistics:".bold());
    eprintln!("  Iterations: {}", stats.iterations);
    eprintln!(
        "  Edits: {} attempted, {} committed ({} removals, {} hoists)",
        stats.attempts, stats.committed, stats.removals, stats.hoists
    );
    eprintln!(
        "  Rejected: {} render failures, {} no-ops, {} verification failures",
        stats.render_failures, stats.no_ops, stats.verification_failures
    );
    eprintln!(
        "  Size: {} -> {} bytes ({} saved)",
        stats.initial_bytes,
        stats.final_bytes,
        saved.to_string().green()
    );
}

/// Spinner on stderr, cleared when finished or dropped
pub struct Spinner {
    bar: ProgressBar,
}

impl Spinner {
    pub fn start(message: String) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed}]") {
            bar.set_style(style);
        }
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(100));
        Self { bar }
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}

impl Drop for Spinner {
    fn drop(&mut self) {
        if !self.bar.is_finished() {
            self.bar.finish_and_clear();
        }
    }
}
