//! Diagnostic rendering: human-readable text and machine-readable JSON.

use arblint::{Diagnostic, Severity};
use clap::ValueEnum;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// All findings for one linted file.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    pub diagnostics: Vec<Diagnostic>,
}

pub fn print_text(report: &FileReport, source: &str) {
    for diagnostic in &report.diagnostics {
        let (line, column) = line_col(source, diagnostic.span.start);
        println!(
            "{}:{}:{}: {}[{}]: {}",
            report.path,
            line,
            column,
            severity_label(diagnostic.severity),
            diagnostic.code,
            diagnostic.message
        );
    }
}

pub fn print_json(reports: &[FileReport]) -> Result<(), String> {
    let rendered = serde_json::to_string_pretty(reports)
        .map_err(|e| format!("Failed to serialize report: {}", e))?;
    println!("{}", rendered);
    Ok(())
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Warning => "warning",
        Severity::Information => "info",
    }
}

/// 1-based line and column for a byte offset, clamped to the text.
pub fn line_col(text: &str, offset: usize) -> (usize, usize) {
    let mut at = offset.min(text.len());
    while at > 0 && !text.is_char_boundary(at) {
        at -= 1;
    }
    let before = &text[..at];
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let line = before.matches('\n').count() + 1;
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}
