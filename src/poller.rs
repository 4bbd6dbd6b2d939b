use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::debug;

use crate::config::{ApiConfig, RUN_STATUS_CHECK_INTERVAL_MS};
use crate::error::RunError;
use crate::fetch::Fetcher;
use crate::model::{RunInfo, TestRecord};

/// Coarse progress of a tracked run instance. Formatting lives in the
/// render layer; equality of `Running` covers the whole detail string, so
/// a different in-progress test counts as a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunLabel {
    Queued,
    Scheduled,
    Started,
    Running { test: String },
    Ended { ok: bool },
}

/// One observed progress transition of one run instance.
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub instance_id: String,
    pub label: RunLabel,
}

/// Polls run instances until they report completion.
#[derive(Clone)]
pub struct RunTracker {
    fetcher: Fetcher,
    api: ApiConfig,
    interval: Duration,
}

impl RunTracker {
    pub fn new(fetcher: Fetcher, api: ApiConfig) -> Self {
        Self {
            fetcher,
            api,
            interval: Duration::from_millis(RUN_STATUS_CHECK_INTERVAL_MS),
        }
    }

    /// Override the poll interval (tests use a short one).
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Track one run instance until it finishes and return the final
    /// payload. Progress transitions go out on `events` as they happen;
    /// each label is emitted only when it differs from the last one.
    ///
    /// The interval is a minimum gap between the end of one check and the
    /// start of the next, not a fixed-rate clock.
    pub async fn track(
        &self,
        instance_id: &str,
        events: UnboundedSender<ProgressEvent>,
    ) -> Result<RunInfo, RunError> {
        let mut last = RunLabel::Queued;
        emit(&events, instance_id, last.clone());

        loop {
            sleep(self.interval).await;

            let run = self.check(instance_id).await?;

            if run.finished {
                emit(&events, instance_id, RunLabel::Ended { ok: !run.has_error });
                return Ok(run);
            }

            if let Some(label) = current_label(&run) {
                if label != last {
                    emit(&events, instance_id, label.clone());
                }
                last = label;
            }
        }
    }

    /// One status fetch. A fetch error or non-200 is fatal for the
    /// instance; transport-level retry already happened inside the fetcher.
    async fn check(&self, instance_id: &str) -> Result<RunInfo, RunError> {
        let url = self.api.run_status_url(instance_id);
        let result =
            self.fetcher
                .get(&url)
                .await
                .map_err(|source| RunError::RunCheckFailed {
                    instance_id: instance_id.to_string(),
                    status: None,
                    source: Some(source),
                })?;

        if result.status != 200 {
            return Err(RunError::RunCheckFailed {
                instance_id: instance_id.to_string(),
                status: Some(result.status),
                source: None,
            });
        }

        let data = result
            .body
            .as_json()
            .and_then(|body| body.get("data"))
            .cloned()
            .unwrap_or(serde_json::Value::Null);

        serde_json::from_value(data).map_err(|source| RunError::BadStatusPayload {
            instance_id: instance_id.to_string(),
            source,
        })
    }
}

/// Track every instance concurrently and resolve once all of them have
/// finished, in completion order. The first fatal tracker error aborts the
/// remaining trackers and is returned; no partial result survives.
pub async fn track_all(
    tracker: RunTracker,
    instance_ids: Vec<String>,
    events: UnboundedSender<ProgressEvent>,
) -> Result<Vec<RunInfo>, RunError> {
    let mut tasks = JoinSet::new();
    for instance_id in instance_ids {
        let tracker = tracker.clone();
        let events = events.clone();
        tasks.spawn(async move { tracker.track(&instance_id, events).await });
    }

    let mut finished = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(Ok(run)) => finished.push(run),
            Ok(Err(err)) => return Err(err),
            Err(err) => return Err(RunError::Tracker(err.to_string())),
        }
    }
    Ok(finished)
}

/// Coarse label of an unfinished snapshot. `None` means the payload shows
/// no observable state yet; the caller keeps the previous label.
fn current_label(run: &RunInfo) -> Option<RunLabel> {
    if run.started && !run.tests.is_empty() {
        Some(RunLabel::Running {
            test: most_in_progress_path(&run.tests),
        })
    } else if run.started {
        Some(RunLabel::Started)
    } else if run.scheduled {
        Some(RunLabel::Scheduled)
    } else {
        None
    }
}

/// Path of the test judged most in-progress, rendered as `resId@line`
/// segments (lines shown 1-based) joined by " / ". A still-running test
/// always beats a finished one, later starts beat earlier ones, remaining
/// ties keep input order.
pub fn most_in_progress_path(tests: &HashMap<String, TestRecord>) -> String {
    let mut candidates: Vec<&TestRecord> = tests.values().collect();
    candidates.sort_by(|a, b| running_first(a, b).then_with(|| later_start_first(a, b)));

    let Some(winner) = candidates.first() else {
        return String::new();
    };
    winner
        .path
        .iter()
        .map(|segment| format!("{}@{}", segment.res_id, segment.line + 1))
        .collect::<Vec<_>>()
        .join(" / ")
}

fn running_first(a: &TestRecord, b: &TestRecord) -> Ordering {
    match (a.finished, b.finished) {
        (false, true) => Ordering::Less,
        (true, false) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}

fn later_start_first(a: &TestRecord, b: &TestRecord) -> Ordering {
    match (a.start_ts, b.start_ts) {
        (Some(a), Some(b)) => b.cmp(&a),
        _ => Ordering::Equal,
    }
}

fn emit(events: &UnboundedSender<ProgressEvent>, instance_id: &str, label: RunLabel) {
    debug!("run instance {} progress: {:?}", instance_id, label);
    let _ = events.send(ProgressEvent {
        instance_id: instance_id.to_string(),
        label,
    });
}
