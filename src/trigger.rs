use tracing::info;

use crate::config::ApiConfig;
use crate::error::RunError;
use crate::fetch::Fetcher;

/// Trigger a run definition and return the created run instance ids.
///
/// A 404 means the definition does not exist; any other non-200 (or a
/// fetch failure) is a generic trigger failure. A successful trigger that
/// creates no instances is an error of its own — there is nothing to poll.
pub async fn trigger_run(
    fetcher: &Fetcher,
    api: &ApiConfig,
    run_def_id: &str,
) -> Result<Vec<String>, RunError> {
    let url = api.trigger_url(run_def_id);
    info!("triggering run \"{}\"", run_def_id);

    let result = fetcher
        .get(&url)
        .await
        .map_err(|source| RunError::TriggerFailed {
            run_def_id: run_def_id.to_string(),
            status: None,
            source: Some(source),
        })?;

    match result.status {
        200 => {}
        404 => return Err(RunError::DefinitionNotFound(run_def_id.to_string())),
        status => {
            return Err(RunError::TriggerFailed {
                run_def_id: run_def_id.to_string(),
                status: Some(status),
                source: None,
            })
        }
    }

    let instance_ids: Vec<String> = result
        .body
        .as_json()
        .and_then(|body| body.get("data"))
        .and_then(|data| data.as_array())
        .map(|ids| {
            ids.iter()
                .filter_map(|id| id.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();

    if instance_ids.is_empty() {
        return Err(RunError::NoInstancesCreated(run_def_id.to_string()));
    }

    info!(
        "run \"{}\" created {} instance(s)",
        run_def_id,
        instance_ids.len()
    );
    Ok(instance_ids)
}
