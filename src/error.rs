/// Failures of a single fetch, after internal retries are exhausted.
///
/// HTTP error statuses are not in here: the fetcher hands 4xx/5xx back as
/// ordinary results and leaves their interpretation to the caller.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("too many redirects (limit {0})")]
    TooManyRedirects(u32),

    #[error("redirect response without a usable Location header")]
    MissingLocation,

    #[error("invalid url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Fatal failures of the run-tracking flow. Any of these terminates the
/// whole process; partial results from other instances are discarded.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("run definition \"{0}\" does not exist")]
    DefinitionNotFound(String),

    #[error("triggering run \"{run_def_id}\" failed{}", status_suffix(.status))]
    TriggerFailed {
        run_def_id: String,
        status: Option<u16>,
        #[source]
        source: Option<FetchError>,
    },

    #[error("triggering run \"{0}\" failed, no instances created")]
    NoInstancesCreated(String),

    #[error("checking run instance \"{instance_id}\" status failed{}", status_suffix(.status))]
    RunCheckFailed {
        instance_id: String,
        status: Option<u16>,
        #[source]
        source: Option<FetchError>,
    },

    #[error("run instance \"{instance_id}\" returned an unexpected status payload")]
    BadStatusPayload {
        instance_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("run tracker failed: {0}")]
    Tracker(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {})", code),
        None => String::new(),
    }
}
