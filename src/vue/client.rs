use super::auth::TokenProvider;
use super::throttle::RateLimiter;
use super::{HistoryPage, HistoryQuery, UsageApi, UsageSnapshot, VueError};
use crate::datamodel::{
    Device, DeviceGid, DeviceUsage, EnergyUnit, Scale, SyncDateTime, SyncDateTimeExt,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use url::Url;

pub const DEFAULT_API_BASE_URL: &str = "https://api.emporiaenergy.com/";

/// Header carrying the identity token on every request.
const AUTH_HEADER: &str = "authtoken";

/// HTTP implementation of [`UsageApi`].
///
/// Every request waits on the shared rate limiter, then asks the token
/// provider for a valid token.
pub struct VueClient {
    http: reqwest::Client,
    base_url: Url,
    limiter: Arc<RateLimiter>,
    tokens: Arc<dyn TokenProvider>,
    cancel: CancellationToken,
}

#[derive(Deserialize)]
struct DevicesResponse {
    #[serde(default)]
    devices: Vec<Device>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeviceListUsagesResponse {
    device_list_usages: DeviceListUsages,
}

#[derive(Deserialize)]
struct DeviceListUsages {
    instant: SyncDateTime,
    #[serde(default)]
    devices: Vec<DeviceUsage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartUsageResponse {
    #[serde(default)]
    usage_list: Vec<Option<f64>>,
    first_usage_instant: SyncDateTime,
}

impl VueClient {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        limiter: Arc<RateLimiter>,
        tokens: Arc<dyn TokenProvider>,
    ) -> Result<Self, VueError> {
        Ok(Self {
            http,
            base_url: Url::parse(base_url)?,
            limiter,
            tokens,
            cancel: CancellationToken::new(),
        })
    }

    /// Requests waiting on the rate limiter give up once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, VueError> {
        self.limiter.wait_or_cancel(&self.cancel).await?;
        let token = self.tokens.token().await?;

        let url = self.base_url.join(path)?;
        let response = self
            .http
            .get(url)
            .query(query)
            .header(AUTH_HEADER, token.id_token)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VueError::Status {
                endpoint: path.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl UsageApi for VueClient {
    async fn devices(&self) -> Result<Vec<Device>, VueError> {
        let body: DevicesResponse = self.get("customers/devices", &[]).await?;
        Ok(body.devices)
    }

    async fn usage(
        &self,
        devices: &[DeviceGid],
        instant: SyncDateTime,
        scale: Scale,
        energy_unit: EnergyUnit,
    ) -> Result<UsageSnapshot, VueError> {
        let device_gids = devices
            .iter()
            .map(DeviceGid::to_string)
            .collect::<Vec<_>>()
            .join(" ");
        let body: DeviceListUsagesResponse = self
            .get(
                "AppAPI",
                &[
                    ("apiMethod", "getDeviceListUsages".to_string()),
                    ("deviceGids", device_gids),
                    ("instant", instant.to_api_string()),
                    ("scale", scale.to_string()),
                    ("energyUnit", energy_unit.to_string()),
                ],
            )
            .await?;
        Ok(UsageSnapshot {
            instant: body.device_list_usages.instant,
            devices: body.device_list_usages.devices,
        })
    }

    async fn history_page(
        &self,
        query: &HistoryQuery<'_>,
        start: SyncDateTime,
        end: SyncDateTime,
    ) -> Result<HistoryPage, VueError> {
        let body: ChartUsageResponse = self
            .get(
                "AppAPI",
                &[
                    ("apiMethod", "getChartUsage".to_string()),
                    ("deviceGid", query.device_gid.to_string()),
                    ("channel", query.channel.to_string()),
                    ("start", start.to_api_string()),
                    ("end", end.to_api_string()),
                    ("scale", query.scale.to_string()),
                    ("energyUnit", query.energy_unit.to_string()),
                ],
            )
            .await?;
        debug!(
            "getChartUsage returned {} slots from {}",
            body.usage_list.len(),
            body.first_usage_instant
        );
        Ok(HistoryPage {
            first_instant: body.first_usage_instant,
            usage: body.usage_list,
        })
    }
}
