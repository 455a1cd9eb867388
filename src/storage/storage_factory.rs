use std::sync::Arc;

use anyhow::{Result, bail};

use super::StorageInstance;
use super::victoria_metrics::VictoriaMetricsStorage;

/// Builds the store behind a destination string.
///
/// A bare `host:port` is taken as a VictoriaMetrics address.
pub fn create_storage_from_connection_string(
    connection_string: &str,
    http: reqwest::Client,
) -> Result<Arc<dyn StorageInstance>> {
    Ok(match connection_string {
        "" => bail!("Empty destination"),

        s if s.starts_with("victoriametrics:")
            || s.starts_with("http://")
            || s.starts_with("https://") =>
        {
            Arc::new(VictoriaMetricsStorage::connect(s, http)?)
        }

        s if s.contains("://") => bail!("Unsupported destination: {}", s),

        s => Arc::new(VictoriaMetricsStorage::connect(s, http)?),
    })
}
