//! Client side of the Emporia Vue usage API.

pub mod auth;
pub mod client;
pub mod cognito;
pub mod history;
pub mod throttle;

pub use auth::{AuthError, Authenticator, CachedTokenSource, Credentials, TokenProvider};
pub use client::VueClient;
pub use cognito::CognitoAuthenticator;
pub use history::{History, HistoryError, fetch_history};
pub use throttle::{RateLimiter, ThrottleError};

use crate::datamodel::{
    Device, DeviceGid, DeviceUsage, EnergyUnit, Scale, SyncDateTime,
};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VueError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Request to {endpoint} failed ({status}): {body}")]
    Status {
        endpoint: String,
        status: u16,
        body: String,
    },

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Throttle(#[from] ThrottleError),
}

/// What to fetch for one channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HistoryQuery<'a> {
    pub device_gid: DeviceGid,
    pub channel: &'a str,
    pub scale: Scale,
    pub energy_unit: EnergyUnit,
}

/// One chart usage answer: a slot per scale bucket, `None` where there is no data.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryPage {
    pub first_instant: SyncDateTime,
    pub usage: Vec<Option<f64>>,
}

/// Current usage of a list of devices.
#[derive(Debug, Clone, PartialEq)]
pub struct UsageSnapshot {
    pub instant: SyncDateTime,
    pub devices: Vec<DeviceUsage>,
}

#[async_trait]
pub trait UsageApi: Send + Sync {
    async fn devices(&self) -> Result<Vec<Device>, VueError>;

    async fn usage(
        &self,
        devices: &[DeviceGid],
        instant: SyncDateTime,
        scale: Scale,
        energy_unit: EnergyUnit,
    ) -> Result<UsageSnapshot, VueError>;

    /// A single chart usage request. The interval must fit in one page of the scale.
    async fn history_page(
        &self,
        query: &HistoryQuery<'_>,
        start: SyncDateTime,
        end: SyncDateTime,
    ) -> Result<HistoryPage, VueError>;
}
