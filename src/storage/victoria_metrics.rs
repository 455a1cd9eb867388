use super::query::parse_query_response;
use super::{QueryResult, StorageError, StorageInstance};
use crate::codec::write_series_lines;
use crate::datamodel::Series;
use async_trait::async_trait;
use flate2::Compression;
use flate2::write::GzEncoder;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};
use tracing::debug;
use url::Url;

const IMPORT_PATH: &str = "api/v1/import";
const QUERY_PATH: &str = "api/v1/query";

/// VictoriaMetrics over its HTTP API.
///
/// Pushes go to the JSON line import endpoint, gzip compressed. Queries use
/// the Prometheus compatible instant query endpoint.
#[derive(Debug, Clone)]
pub struct VictoriaMetricsStorage {
    http: reqwest::Client,
    base_url: Url,
}

impl VictoriaMetricsStorage {
    /// Accepts `host:port`, `http://host:port` or
    /// `victoriametrics://host:port`.
    pub fn connect(connection_string: &str, http: reqwest::Client) -> Result<Self, StorageError> {
        let address = connection_string
            .strip_prefix("victoriametrics://")
            .unwrap_or(connection_string);
        let mut base_url = if address.starts_with("http://") || address.starts_with("https://") {
            Url::parse(address)?
        } else {
            Url::parse(&format!("http://{}", address))?
        };
        if base_url.host_str().is_none() {
            return Err(StorageError::Configuration(format!(
                "No host in destination {:?}",
                connection_string
            )));
        }
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn compress(series: &[Series]) -> Result<Vec<u8>, StorageError> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        write_series_lines(&mut encoder, series)?;
        Ok(encoder.finish()?)
    }

    async fn check_status(
        endpoint: &Url,
        response: reqwest::Response,
    ) -> Result<reqwest::Response, StorageError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(StorageError::Status {
            endpoint: endpoint.path().to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl StorageInstance for VictoriaMetricsStorage {
    async fn push(&self, series: &[Series]) -> Result<(), StorageError> {
        let endpoint = self.base_url.join(IMPORT_PATH)?;
        let body = Self::compress(series)?;
        debug!(
            "Pushing {} series ({} bytes compressed) to {}",
            series.len(),
            body.len(),
            endpoint
        );
        let response = self
            .http
            .post(endpoint.clone())
            .header(CONTENT_ENCODING, "gzip")
            .header(CONTENT_TYPE, "application/stream+json")
            .body(body)
            .send()
            .await?;
        Self::check_status(&endpoint, response).await?;
        Ok(())
    }

    async fn query(&self, query: &str) -> Result<QueryResult, StorageError> {
        let endpoint = self.base_url.join(QUERY_PATH)?;
        let response = self
            .http
            .get(endpoint.clone())
            .query(&[("query", query)])
            .send()
            .await?;
        let response = Self::check_status(&endpoint, response).await?;
        let body = response.bytes().await?;
        let result = parse_query_response(&body)?;
        debug!("Query {} returned {:?}", query, result);
        Ok(result)
    }
}
