use serde::{Deserialize, Serialize};
use std::fmt;

/// Device identifier assigned by the usage API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DeviceGid(pub u64);

impl fmt::Display for DeviceGid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_gid: DeviceGid,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub channels: Vec<Channel>,
    #[serde(default)]
    pub devices: Vec<Device>,
}

impl Device {
    /// All channels of this device followed by those of its nested devices.
    pub fn all_channels(&self) -> Vec<&Channel> {
        let mut channels: Vec<&Channel> = self.channels.iter().collect();
        for nested in &self.devices {
            channels.extend(nested.all_channels());
        }
        channels
    }
}

/// One measurable stream of a device, such as a circuit or the device total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    #[serde(default)]
    pub name: Option<String>,
    pub device_gid: DeviceGid,
    /// "1,2,3", "1", "Balance"...
    pub channel_num: String,
    #[serde(default = "default_multiplier")]
    pub channel_multiplier: f64,
}

fn default_multiplier() -> f64 {
    1.0
}

impl Channel {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceUsage {
    pub device_gid: DeviceGid,
    #[serde(default)]
    pub channel_usages: Vec<ChannelUsage>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelUsage {
    #[serde(default)]
    pub name: Option<String>,
    pub usage: Option<f64>,
    pub channel_num: String,
    #[serde(default)]
    pub nested_devices: Vec<DeviceUsage>,
}
