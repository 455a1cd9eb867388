use chrono::{DateTime, SecondsFormat, Utc};

pub type SyncDateTime = DateTime<Utc>;

pub trait SyncDateTimeExt: Sized {
    fn from_unix_milliseconds_i64(timestamp: i64) -> Option<Self>;
    fn from_unix_seconds_i64(timestamp: i64) -> Option<Self>;
    /// RFC 3339, UTC, second precision. The format the usage API expects.
    fn to_api_string(&self) -> String;
}

impl SyncDateTimeExt for SyncDateTime {
    fn from_unix_milliseconds_i64(timestamp: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(timestamp)
    }
    fn from_unix_seconds_i64(timestamp: i64) -> Option<Self> {
        DateTime::from_timestamp(timestamp, 0)
    }
    fn to_api_string(&self) -> String {
        self.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
