use chrono::{TimeZone, Utc};

use crate::model::{RunInfo, TestRecord};

/// Display state of a single test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TestState {
    Passed,
    Failed,
    Running,
    Timeouted,
}

impl TestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestState::Passed => "passed",
            TestState::Failed => "failed",
            TestState::Running => "running",
            TestState::Timeouted => "timeouted",
        }
    }
}

/// One row of the results table, fully derived from a [`TestRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestReportRow {
    pub suite_path: String,
    pub name: String,
    pub start: String,
    pub end: String,
    pub duration: String,
    pub state: TestState,
    pub sort_key: String,
}

impl TestReportRow {
    pub fn passed(&self) -> bool {
        self.state == TestState::Passed
    }
}

/// Build the ordered report for one run snapshot. `now_ms` is compared
/// against the run's timeout when deriving the state of unfinished tests.
pub fn build_report(run: &RunInfo, now_ms: i64) -> Vec<TestReportRow> {
    let mut rows: Vec<TestReportRow> = run
        .tests
        .values()
        .map(|test| build_row(test, run.timeout_ts, now_ms))
        .collect();
    rows.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
    rows
}

fn build_row(test: &TestRecord, timeout_ts: Option<i64>, now_ms: i64) -> TestReportRow {
    let name = test
        .path
        .last()
        .map(|leaf| strip_prefix_chars(&leaf.res_id, 5))
        .unwrap_or_default()
        .to_string();

    let suite_path = match test.path.len() {
        0 => String::new(),
        len => test.path[..len - 1]
            .iter()
            .map(|segment| strip_prefix_chars(&segment.res_id, 10))
            .collect::<Vec<_>>()
            .join(" / "),
    };

    // Zero-padded to 5 digits so plain string comparison reproduces the
    // numeric document order of nested suites; lines >= 100000 are
    // out-of-range input.
    let sort_key = test
        .path
        .iter()
        .map(|segment| format!("{:05}", segment.line))
        .collect::<Vec<_>>()
        .join("-");

    TestReportRow {
        suite_path,
        name,
        start: format_time(test.start_ts),
        end: if test.finished {
            format_time(test.end_ts)
        } else {
            String::new()
        },
        duration: format_duration(test.start_ts, test.end_ts),
        state: test_state(test, timeout_ts, now_ms),
        sort_key,
    }
}

/// State of one test. The timeout belongs to the enclosing run, so it is
/// passed in rather than read off the record; a run without a timeout
/// never times out.
pub fn test_state(test: &TestRecord, timeout_ts: Option<i64>, now_ms: i64) -> TestState {
    if test.finished && !test.failed && !test.error {
        TestState::Passed
    } else if test.failed || test.error {
        TestState::Failed
    } else if timeout_ts.is_some_and(|timeout| now_ms >= timeout) {
        TestState::Timeouted
    } else {
        TestState::Running
    }
}

/// Epoch milliseconds as UTC `HH:MM:SS`; absent or unrepresentable values
/// render empty.
pub fn format_time(ts: Option<i64>) -> String {
    match ts.and_then(|ms| Utc.timestamp_millis_opt(ms).single()) {
        Some(at) => at.format("%H:%M:%S").to_string(),
        None => String::new(),
    }
}

/// Elapsed span as `MM:SS.CC` — total minutes (hours folded in), seconds,
/// rounded hundredths — or empty unless both endpoints are known.
pub fn format_duration(start_ts: Option<i64>, end_ts: Option<i64>) -> String {
    let (Some(start), Some(end)) = (start_ts, end_ts) else {
        return String::new();
    };
    let elapsed_ms = (end - start).max(0);
    let minutes = elapsed_ms / 60_000;
    let seconds = (elapsed_ms / 1_000) % 60;
    let hundredths = ((elapsed_ms % 1_000) as f64 / 10.0).round() as i64;
    format!("{:02}:{:02}.{:02}", minutes, seconds, hundredths)
}

/// `s` without its first `n` bytes; ids shorter than the prefix yield an
/// empty string.
fn strip_prefix_chars(s: &str, n: usize) -> &str {
    s.get(n..).unwrap_or("")
}
