//! Presentation glue: progress lines and the results table. Plain text,
//! no styling dependency.

use chrono::{DateTime, Utc};

use crate::config::ApiConfig;
use crate::model::RunInfo;
use crate::poller::{ProgressEvent, RunLabel};
use crate::report::TestReportRow;

const INSTANCE_COLUMN_WIDTH: usize = 12;
const REPORT_COLUMNS: [&str; 6] = ["Suite", "Test", "Started", "Ended", "Duration", "Status"];

/// User-facing text of a progress label. `ENDED` reads the same for both
/// outcomes; the outcome drives the exit code, not the label.
pub fn label_text(label: &RunLabel) -> String {
    match label {
        RunLabel::Queued => "QUEUED".to_string(),
        RunLabel::Scheduled => "SCHEDULED".to_string(),
        RunLabel::Started => "STARTED".to_string(),
        RunLabel::Running { test } => format!("RUNNING {}", test),
        RunLabel::Ended { .. } => "ENDED".to_string(),
    }
}

/// One progress line: UTC timestamp, padded instance id, label.
pub fn progress_line(event: &ProgressEvent) -> String {
    progress_line_at(event, Utc::now())
}

pub fn progress_line_at(event: &ProgressEvent, at: DateTime<Utc>) -> String {
    format!(
        "{} {:<width$}.............. {}",
        at.format("%d.%m.%Y %H:%M:%S"),
        event.instance_id,
        label_text(&event.label),
        width = INSTANCE_COLUMN_WIDTH,
    )
}

/// Heading, follow-up link and results table for one finished instance.
pub fn run_report(run: &RunInfo, rows: &[TestReportRow], api: &ApiConfig) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "Results of run \"{}\" on {} ({}x{})\n",
        run.id, run.browser, run.screen_width, run.screen_height
    ));
    out.push_str(&format!(
        "More info and recordings here: {}\n",
        api.report_url(&run.run_def_id, &run.id)
    ));
    out.push_str(&report_table(rows));
    out
}

/// Bordered fixed-width table of report rows.
pub fn report_table(rows: &[TestReportRow]) -> String {
    let mut table: Vec<Vec<String>> = Vec::with_capacity(rows.len() + 1);
    table.push(REPORT_COLUMNS.iter().map(|c| c.to_string()).collect());
    for row in rows {
        table.push(vec![
            row.suite_path.clone(),
            row.name.clone(),
            row.start.clone(),
            row.end.clone(),
            row.duration.clone(),
            row.state.as_str().to_string(),
        ]);
    }

    let mut widths = vec![0usize; REPORT_COLUMNS.len()];
    for line in &table {
        for (i, cell) in line.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let separator = widths
        .iter()
        .map(|w| "-".repeat(w + 2))
        .collect::<Vec<_>>()
        .join("+");
    let separator = format!("+{}+", separator);

    let mut out = String::new();
    out.push_str(&separator);
    for (i, line) in table.iter().enumerate() {
        out.push('\n');
        let cells = line
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!(" {:<width$} ", cell, width = width))
            .collect::<Vec<_>>()
            .join("|");
        out.push_str(&format!("|{}|", cells));
        if i == 0 {
            out.push('\n');
            out.push_str(&separator);
        }
    }
    out.push('\n');
    out.push_str(&separator);
    out
}
