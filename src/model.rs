use serde::Deserialize;
use std::collections::HashMap;

/// One node (suite or test) in a test's hierarchical location, root to leaf.
#[derive(Debug, Clone, Deserialize)]
pub struct PathSegment {
    #[serde(rename = "resId")]
    pub res_id: String,
    pub line: u32,
}

/// Result record of a single test, keyed by its path in [`RunInfo::tests`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TestRecord {
    #[serde(default)]
    pub path: Vec<PathSegment>,
    #[serde(rename = "startTS", default)]
    pub start_ts: Option<i64>,
    #[serde(rename = "endTS", default)]
    pub end_ts: Option<i64>,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub failed: bool,
    #[serde(default)]
    pub error: bool,
}

/// Snapshot of one run instance as reported by the status endpoint.
///
/// Snapshots are replaced wholesale on every poll; nothing in here is
/// mutated locally.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunInfo {
    pub id: String,
    #[serde(default)]
    pub run_def_id: String,
    #[serde(default)]
    pub browser: String,
    #[serde(default)]
    pub screen_width: u32,
    #[serde(default)]
    pub screen_height: u32,
    #[serde(default)]
    pub scheduled: bool,
    #[serde(default)]
    pub started: bool,
    #[serde(default)]
    pub finished: bool,
    #[serde(default)]
    pub has_error: bool,
    /// Epoch milliseconds after which unfinished tests count as timed out.
    #[serde(rename = "timeoutTS", default)]
    pub timeout_ts: Option<i64>,
    #[serde(default)]
    pub tests: HashMap<String, TestRecord>,
}
