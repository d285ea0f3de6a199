//! Output formatting helpers for the `colab-badge` CLI.
//!
//! Provides the JSON run report and the human-readable per-file lines.

use std::io::{self, Write};
use std::path::Path;

use colab_badge_core::io::{FileOutcome, ProcessMode};
use colab_badge_core::NotebookError;
use colab_badge_ui::styles::{
    render_accent, render_bold, render_fail, render_fail_icon, render_muted, render_pass,
    render_pass_icon, render_skip_icon, render_warn, render_warn_icon,
};
use serde::Serialize;

use crate::context::RuntimeContext;

/// Per-file result as shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// The notebook was rewritten.
    Updated,
    /// The notebook already had the right badge.
    Unchanged,
    /// Check mode: the notebook would be rewritten.
    Stale,
    /// The notebook could not be processed.
    Error,
}

impl FileStatus {
    pub fn from_outcome(outcome: FileOutcome, mode: ProcessMode) -> Self {
        match (outcome, mode) {
            (FileOutcome::Unchanged, _) => Self::Unchanged,
            (FileOutcome::Changed, ProcessMode::Write) => Self::Updated,
            (FileOutcome::Changed, ProcessMode::Check) => Self::Stale,
        }
    }
}

/// One line of the run report.
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: String,
    pub status: FileStatus,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn ok(path: &Path, url: String, status: FileStatus) -> Self {
        Self {
            path: path.display().to_string(),
            status,
            url,
            error: None,
        }
    }

    pub fn failed(path: &Path, url: String, err: &NotebookError) -> Self {
        Self {
            path: path.display().to_string(),
            status: FileStatus::Error,
            url,
            error: Some(err.to_string()),
        }
    }
}

/// Summary of a whole run, emitted as JSON with `--json`.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub mode: &'static str,
    pub files: Vec<FileReport>,
    pub updated: usize,
    pub unchanged: usize,
    pub stale: usize,
    pub failed: usize,
}

impl RunReport {
    pub fn new(mode: ProcessMode) -> Self {
        Self {
            mode: match mode {
                ProcessMode::Write => "update",
                ProcessMode::Check => "check",
            },
            files: Vec::new(),
            updated: 0,
            unchanged: 0,
            stale: 0,
            failed: 0,
        }
    }

    pub fn push(&mut self, entry: FileReport) {
        match entry.status {
            FileStatus::Updated => self.updated += 1,
            FileStatus::Unchanged => self.unchanged += 1,
            FileStatus::Stale => self.stale += 1,
            FileStatus::Error => self.failed += 1,
        }
        self.files.push(entry);
    }
}

/// Print a value as pretty-printed JSON to stdout.
///
/// Terminates the process with exit code 1 if serialization fails.
pub fn output_json<T: Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            // Ignore broken pipe errors (e.g., piped to `head`)
            let _ = writeln!(handle, "{}", json);
        }
        Err(e) => {
            eprintln!("Error: failed to serialize JSON: {}", e);
            std::process::exit(1);
        }
    }
}

/// Print the human-readable line for one file.
///
/// Failures always go to stderr; everything else is suppressed by `--quiet`.
pub fn print_file_line(ctx: &RuntimeContext, entry: &FileReport) {
    let line = match entry.status {
        FileStatus::Error => {
            eprintln!(
                "{} {}: {}",
                render_fail_icon(),
                entry.path,
                render_fail(entry.error.as_deref().unwrap_or("unknown error"))
            );
            return;
        }
        _ if ctx.quiet => return,
        FileStatus::Updated => format!("{} {} {}", render_pass_icon(), entry.path, render_pass("updated")),
        FileStatus::Unchanged => format!("{} {} {}", render_skip_icon(), entry.path, render_muted("unchanged")),
        FileStatus::Stale => format!("{} {} {}", render_warn_icon(), entry.path, render_warn("needs badge update")),
    };
    println!("{}", line);

    if ctx.verbose {
        println!("    {}", render_accent(&entry.url));
    }
}

/// Print the closing summary line.
pub fn print_summary(ctx: &RuntimeContext, report: &RunReport) {
    if ctx.quiet || report.files.is_empty() {
        return;
    }
    let mut parts = Vec::new();
    if report.updated > 0 {
        parts.push(format!("{} updated", report.updated));
    }
    if report.stale > 0 {
        parts.push(format!("{} stale", report.stale));
    }
    if report.unchanged > 0 {
        parts.push(format!("{} unchanged", report.unchanged));
    }
    if report.failed > 0 {
        parts.push(format!("{} failed", report.failed));
    }
    println!(
        "{} {}",
        render_bold(&format!("{} notebook(s):", report.files.len())),
        parts.join(", ")
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn status_mapping() {
        assert_eq!(
            FileStatus::from_outcome(FileOutcome::Changed, ProcessMode::Write),
            FileStatus::Updated
        );
        assert_eq!(
            FileStatus::from_outcome(FileOutcome::Changed, ProcessMode::Check),
            FileStatus::Stale
        );
        assert_eq!(
            FileStatus::from_outcome(FileOutcome::Unchanged, ProcessMode::Check),
            FileStatus::Unchanged
        );
    }

    #[test]
    fn report_counts_statuses() {
        let mut report = RunReport::new(ProcessMode::Write);
        report.push(FileReport::ok(Path::new("a.ipynb"), "u".into(), FileStatus::Updated));
        report.push(FileReport::ok(Path::new("b.ipynb"), "u".into(), FileStatus::Unchanged));
        report.push(FileReport::ok(Path::new("c.ipynb"), "u".into(), FileStatus::Updated));
        assert_eq!((report.updated, report.unchanged, report.failed), (2, 1, 0));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["mode"], "update");
        assert_eq!(json["files"][0]["status"], "updated");
        assert!(json["files"][0].get("error").is_none());
    }
}
