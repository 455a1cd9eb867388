use super::CodecError;
use crate::datamodel::{Sample, SyncDateTime, SyncDateTimeExt};
use serde::de::Error as _;
use serde::ser::SerializeTuple;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A single sample as returned by instant queries: `[1704067200, "0.25"]`.
///
/// The timestamp travels in epoch seconds and the value as a decimal string.
#[derive(Debug, Clone, PartialEq)]
pub struct InstantSample(pub Sample);

impl InstantSample {
    pub fn value(&self) -> f64 {
        self.0.value
    }

    pub fn timestamp(&self) -> SyncDateTime {
        self.0.timestamp
    }

    pub fn into_sample(self) -> Sample {
        self.0
    }

    fn from_values(values: &[Value]) -> Result<Self, CodecError> {
        if values.len() != 2 {
            return Err(CodecError::InvalidInstantSample(format!(
                "expected an array of 2 elements, got {}",
                values.len()
            )));
        }
        let seconds = values[0].as_f64().ok_or_else(|| {
            CodecError::InvalidInstantSample(format!("timestamp is not a number: {}", values[0]))
        })?;
        let raw_value = values[1].as_str().ok_or_else(|| {
            CodecError::InvalidInstantSample(format!("value is not a string: {}", values[1]))
        })?;
        let value = raw_value.parse::<f64>().map_err(|_| {
            CodecError::InvalidInstantSample(format!("value is not a float: {:?}", raw_value))
        })?;
        let timestamp = SyncDateTime::from_unix_seconds_i64(seconds.trunc() as i64).ok_or_else(
            || CodecError::InvalidInstantSample(format!("timestamp out of range: {}", seconds)),
        )?;
        Ok(InstantSample(Sample { value, timestamp }))
    }
}

impl From<Sample> for InstantSample {
    fn from(sample: Sample) -> Self {
        InstantSample(sample)
    }
}

impl Serialize for InstantSample {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(2)?;
        tuple.serialize_element(&self.0.timestamp.timestamp())?;
        tuple.serialize_element(&self.0.value.to_string())?;
        tuple.end()
    }
}

impl<'de> Deserialize<'de> for InstantSample {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let values = Vec::<Value>::deserialize(deserializer)?;
        InstantSample::from_values(&values).map_err(D::Error::custom)
    }
}
