use super::{QueryResult, StorageError, StorageInstance};
use crate::datamodel::{Metric, Scale, ScaleError, SyncDateTime, SyncDateTimeExt};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ResumeError {
    #[error(transparent)]
    Scale(#[from] ScaleError),

    #[error("Could not query the last stored sample of {selector}: {source}")]
    Storage {
        selector: String,
        #[source]
        source: StorageError,
    },
}

/// Query returning the timestamp, in epoch seconds, of the newest sample of
/// `metric` within `window_seconds` of the evaluation time.
pub fn last_timestamp_query(metric: &Metric, window_seconds: i64) -> String {
    format!("timestamp({}[{}s])", metric.selector(), window_seconds)
}

/// Finds where an export of `metric` over `[start, end)` should begin.
///
/// When the store already holds data for the series inside the window, the
/// export restarts one scale step after the newest stored sample, never
/// before `start`. An empty answer means a full window export. Any other
/// shape of answer is ambiguous and also falls back to `start`.
pub async fn resolve_resume_point(
    storage: &dyn StorageInstance,
    metric: &Metric,
    start: SyncDateTime,
    end: SyncDateTime,
    scale: Scale,
) -> Result<SyncDateTime, ResumeError> {
    let step = scale.duration()?;
    let window_seconds = (end - start).num_seconds();
    if window_seconds <= 0 {
        return Ok(start);
    }

    let selector = metric.selector();
    let query = last_timestamp_query(metric, window_seconds);
    let result = storage
        .query(&query)
        .await
        .map_err(|source| ResumeError::Storage {
            selector: selector.clone(),
            source,
        })?;

    match result {
        QueryResult::Vector(series) if series.is_empty() => Ok(start),
        QueryResult::Vector(series) if series.len() == 1 && series[0].len() == 1 => {
            let seconds = series[0].samples[0].value;
            let resumed = SyncDateTime::from_unix_seconds_i64(seconds.trunc() as i64)
                .and_then(|last| last.checked_add_signed(step));
            match resumed {
                Some(resumed) => Ok(start.max(resumed)),
                None => {
                    debug!("Ignoring out of range last timestamp {} for {}", seconds, selector);
                    Ok(start)
                }
            }
        }
        other => {
            debug!("Ambiguous resume answer for {}: {:?}", selector, other);
            Ok(start)
        }
    }
}
