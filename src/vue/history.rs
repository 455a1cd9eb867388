use super::{HistoryQuery, UsageApi, VueError};
use crate::datamodel::{DeviceGid, ScaleError, SyncDateTime, SyncDateTimeExt};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum HistoryError {
    #[error(transparent)]
    Scale(#[from] ScaleError),

    #[error("History page {page_start} -> {page_end} of device {device_gid} channel {channel} failed: {source}")]
    Page {
        device_gid: DeviceGid,
        channel: String,
        page_start: String,
        page_end: String,
        #[source]
        source: VueError,
    },
}

/// Usage history of a channel. Slot `i` covers `first_instant + i * scale duration`.
#[derive(Debug, Clone, PartialEq)]
pub struct History {
    pub first_instant: SyncDateTime,
    pub usage: Vec<Option<f64>>,
}

/// Fetches `[start, end)`, issuing one request per page of the scale.
///
/// Pages are requested in order and their slots concatenated. Empty slots are
/// kept so positions still map to timestamps. The first page's first instant
/// stands for the whole interval. Any failed page aborts the fetch.
pub async fn fetch_history(
    api: &dyn UsageApi,
    query: &HistoryQuery<'_>,
    start: SyncDateTime,
    end: SyncDateTime,
) -> Result<History, HistoryError> {
    let page_size = query.scale.page_size()?;

    let mut first_instant: Option<SyncDateTime> = None;
    let mut usage = Vec::new();
    let mut cursor = start;
    while cursor < end {
        let page_end = std::cmp::min(end, cursor + page_size);
        debug!(
            "getChartUsage {} {} ({} -> {}) {} {}",
            query.device_gid,
            query.channel,
            cursor.to_api_string(),
            page_end.to_api_string(),
            query.scale,
            query.energy_unit
        );
        let page = api
            .history_page(query, cursor, page_end)
            .await
            .map_err(|source| HistoryError::Page {
                device_gid: query.device_gid,
                channel: query.channel.to_string(),
                page_start: cursor.to_api_string(),
                page_end: page_end.to_api_string(),
                source,
            })?;
        first_instant.get_or_insert(page.first_instant);
        usage.extend(page.usage);
        cursor = page_end;
    }

    Ok(History {
        first_instant: first_instant.unwrap_or(start),
        usage,
    })
}
