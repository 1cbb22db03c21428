// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal, quiet (CI), and JSON output modes.

use serde::Serialize;

use crate::history::DeployRecord;
use crate::migrate::MigrationReport;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly tables and messages
    Normal,
    /// Minimal output for CI (ids and final results only)
    Quiet,
    /// JSON lines for scripting
    Json,
}

/// Handles CLI output based on the configured mode.
pub struct Output {
    mode: OutputMode,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self { mode }
    }

    /// Print a progress message (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            println!("{message}");
        }
    }

    /// Print a success message.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => println!("{message}"),
            OutputMode::Json => print_json(&JsonEvent {
                event: "success",
                message,
            }),
        }
    }

    /// Print an error message.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => eprintln!("Error: {message}"),
            OutputMode::Json => eprint_json(&JsonEvent {
                event: "error",
                message,
            }),
        }
    }

    /// Print deploy history, one record per line.
    pub fn records(&self, records: &[DeployRecord]) {
        match self.mode {
            OutputMode::Normal => print!("{}", render_table(records)),
            OutputMode::Quiet => {
                for record in records {
                    println!("{}", record.id);
                }
            }
            OutputMode::Json => {
                for record in records {
                    print_json(record);
                }
            }
        }
    }

    /// Print a single deploy with its log and diff.
    pub fn record(&self, record: &DeployRecord) {
        match self.mode {
            OutputMode::Normal => print!("{}", render_detail(record)),
            OutputMode::Quiet => println!("{}", record.id),
            OutputMode::Json => print_json(record),
        }
    }

    pub fn migration(&self, report: &MigrationReport) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => println!(
                "Migrated {} deploys ({} already migrated)",
                report.migrated, report.skipped
            ),
            OutputMode::Json => print_json(report),
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
}

fn print_json<T: Serialize>(value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        println!("{json}");
    }
}

fn eprint_json<T: Serialize>(value: &T) {
    if let Ok(json) = serde_json::to_string(value) {
        eprintln!("{json}");
    }
}

fn status(record: &DeployRecord) -> &'static str {
    if record.error.is_empty() {
        "ok"
    } else {
        "failed"
    }
}

/// Render records as an aligned table, or a notice when there are none.
pub fn render_table(records: &[DeployRecord]) -> String {
    if records.is_empty() {
        return "No deploys found\n".to_string();
    }

    let header = [
        "ID", "APP", "DATE", "DURATION", "IMAGE", "ROLLBACK", "ORIGIN", "USER", "STATUS",
    ];
    let rows: Vec<[String; 9]> = records
        .iter()
        .map(|r| {
            [
                r.id.to_string(),
                r.app.clone(),
                r.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
                humantime::format_duration(r.duration).to_string(),
                r.image.clone(),
                if r.can_rollback { "yes" } else { "no" }.to_string(),
                r.origin.clone(),
                r.user.clone(),
                status(r).to_string(),
            ]
        })
        .collect();

    let mut widths = header.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.len());
        }
    }

    let mut out = String::new();
    push_row(&mut out, header.iter().copied(), &widths);
    for row in &rows {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line: Vec<String> = cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect();
    out.push_str(line.join("  ").trim_end());
    out.push('\n');
}

/// Render one record with its log and diff.
pub fn render_detail(record: &DeployRecord) -> String {
    let mut out = format!(
        "Deploy:   {}\nApp:      {}\nDate:     {}\nDuration: {}\nImage:    {}\nCommit:   {}\nOrigin:   {}\nUser:     {}\nStatus:   {}\n",
        record.id,
        record.app,
        record.timestamp.format("%Y-%m-%d %H:%M:%S"),
        humantime::format_duration(record.duration),
        record.image,
        record.commit,
        record.origin,
        record.user,
        status(record),
    );
    if !record.error.is_empty() {
        out.push_str(&format!("Error:    {}\n", record.error));
    }
    if !record.diff.is_empty() {
        out.push_str("\nDiff:\n");
        out.push_str(&record.diff);
        if !record.diff.ends_with('\n') {
            out.push('\n');
        }
    }
    if !record.log.is_empty() {
        out.push_str("\nLog:\n");
        out.push_str(&record.log);
        if !record.log.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EventId;
    use chrono::{TimeZone, Utc};
    use std::time::Duration;

    fn record() -> DeployRecord {
        DeployRecord {
            id: EventId::new("5f1e0c0d2b6f4b8e9a1d3c4b5a6f7e8d"),
            app: "myapp".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, 10, 30, 0).unwrap(),
            duration: Duration::from_secs(95),
            commit: "abc123".to_string(),
            origin: "git".to_string(),
            error: String::new(),
            image: "v3".to_string(),
            can_rollback: true,
            user: "alice".to_string(),
            log: String::new(),
            diff: String::new(),
            remove_date: None,
        }
    }

    #[test]
    fn empty_table_has_notice() {
        assert_eq!(render_table(&[]), "No deploys found\n");
    }

    #[test]
    fn table_has_header_and_one_line_per_record() {
        let mut failed = record();
        failed.error = "build failed".to_string();
        let table = render_table(&[record(), failed]);

        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("ID"));
        assert!(lines[1].contains("1m 35s"));
        assert!(lines[1].ends_with("ok"));
        assert!(lines[2].ends_with("failed"));
    }

    #[test]
    fn detail_includes_error_and_log() {
        let mut r = record();
        r.error = "exit status 1".to_string();
        r.log = "step 1".to_string();
        let detail = render_detail(&r);
        assert!(detail.contains("Error:    exit status 1"));
        assert!(detail.ends_with("Log:\nstep 1\n"));
        assert!(!detail.contains("Diff:"));
    }
}
