use crate::datamodel::{Device, DeviceGid, DeviceUsage, EnergyUnit, Scale, SyncDateTime};
use crate::vue::{HistoryPage, HistoryQuery, UsageApi, UsageSnapshot, VueError};
use async_trait::async_trait;
use std::sync::Mutex;

/// Usage API answering from memory.
///
/// History pages hold one slot per scale bucket of the requested interval,
/// and each slot's value is the epoch seconds of the bucket start, so tests
/// can check where samples land.
#[derive(Default)]
pub struct FakeUsageApi {
    state: Mutex<FakeState>,
}

#[derive(Default)]
struct FakeState {
    devices: Vec<Device>,
    history_requests: Vec<(SyncDateTime, SyncDateTime)>,
    history_channels: Vec<(DeviceGid, String)>,
    first_instant_override: Option<SyncDateTime>,
    null_slots: Vec<usize>,
    failing_request: Option<usize>,
}

impl FakeUsageApi {
    pub fn with_devices(devices: Vec<Device>) -> Self {
        let api = Self::default();
        api.state.lock().unwrap().devices = devices;
        api
    }

    /// Every history request received, failed ones included.
    pub fn history_requests(&self) -> Vec<(SyncDateTime, SyncDateTime)> {
        self.state.lock().unwrap().history_requests.clone()
    }

    pub fn history_channels(&self) -> Vec<(DeviceGid, String)> {
        self.state.lock().unwrap().history_channels.clone()
    }

    /// Pages report this first instant instead of their start.
    pub fn set_first_instant_override(&self, instant: SyncDateTime) {
        self.state.lock().unwrap().first_instant_override = Some(instant);
    }

    /// Slot indices, within each page, answered as null.
    pub fn set_null_slots(&self, slots: Vec<usize>) {
        self.state.lock().unwrap().null_slots = slots;
    }

    /// The n-th history request (0 based) fails with a 500.
    pub fn fail_history_page(&self, request_index: usize) {
        self.state.lock().unwrap().failing_request = Some(request_index);
    }
}

#[async_trait]
impl UsageApi for FakeUsageApi {
    async fn devices(&self) -> Result<Vec<Device>, VueError> {
        Ok(self.state.lock().unwrap().devices.clone())
    }

    async fn usage(
        &self,
        devices: &[DeviceGid],
        instant: SyncDateTime,
        _scale: Scale,
        _energy_unit: EnergyUnit,
    ) -> Result<UsageSnapshot, VueError> {
        // Known devices, no channel data.
        let state = self.state.lock().unwrap();
        Ok(UsageSnapshot {
            instant,
            devices: state
                .devices
                .iter()
                .filter(|device| devices.contains(&device.device_gid))
                .map(|device| DeviceUsage {
                    device_gid: device.device_gid,
                    channel_usages: Vec::new(),
                })
                .collect(),
        })
    }

    async fn history_page(
        &self,
        query: &HistoryQuery<'_>,
        start: SyncDateTime,
        end: SyncDateTime,
    ) -> Result<HistoryPage, VueError> {
        let mut state = self.state.lock().unwrap();
        let index = state.history_requests.len();
        state.history_requests.push((start, end));
        state
            .history_channels
            .push((query.device_gid, query.channel.to_string()));

        let step = query
            .scale
            .duration()
            .map_err(|e| VueError::Status {
                endpoint: "AppAPI".to_string(),
                status: 400,
                body: e.to_string(),
            })?
            .num_seconds();
        if state.failing_request == Some(index) {
            return Err(VueError::Status {
                endpoint: "AppAPI".to_string(),
                status: 500,
                body: "internal error".to_string(),
            });
        }

        let slots = ((end - start).num_seconds() / step) as usize;
        let usage = (0..slots)
            .map(|slot| {
                if state.null_slots.contains(&slot) {
                    None
                } else {
                    Some((start.timestamp() + slot as i64 * step) as f64)
                }
            })
            .collect();
        Ok(HistoryPage {
            first_instant: state.first_instant_override.unwrap_or(start),
            usage,
        })
    }
}
