pub mod datetime;
pub mod device;
pub mod energy_unit;
pub mod metric;
pub mod sample;
pub mod scale;
pub mod series;
pub mod token;

pub use datetime::{SyncDateTime, SyncDateTimeExt};
pub use device::{Channel, ChannelUsage, Device, DeviceGid, DeviceUsage};
pub use energy_unit::EnergyUnit;
pub use metric::{Labels, Metric, NAME_LABEL};
pub use sample::Sample;
pub use scale::{Scale, ScaleError};
pub use series::Series;
pub use token::Token;
