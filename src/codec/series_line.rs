use super::CodecError;
use crate::datamodel::{Labels, Metric, NAME_LABEL, Sample, Series, SyncDateTime, SyncDateTimeExt};
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::io::Write;

/// Serializes a series as one JSON line, without the trailing newline.
///
/// ```json
/// {"metric":{"__name__":"vue_kwh","chan":"1"},"values":[0.5],"timestamps":[1704067200000]}
/// ```
pub fn encode_series(series: &Series) -> Result<String, CodecError> {
    Ok(serde_json::to_string(series)?)
}

pub fn decode_series(line: &str) -> Result<Series, CodecError> {
    let line: SeriesLine = serde_json::from_str(line)?;
    series_from_line(line)
}

/// Writes each series as a newline terminated line, the import body format.
pub fn write_series_lines<W: Write>(writer: &mut W, series: &[Series]) -> Result<(), CodecError> {
    for s in series {
        serde_json::to_writer(&mut *writer, s)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

impl Serialize for Metric {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let labels = self.labels.iter().filter(|(key, _)| *key != NAME_LABEL);
        let mut map = serializer.serialize_map(None)?;
        map.serialize_entry(NAME_LABEL, &self.name)?;
        for (key, value) in labels {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Metric {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut labels = Labels::deserialize(deserializer)?;
        let name = labels.remove(NAME_LABEL).unwrap_or_default();
        Ok(Metric { name, labels })
    }
}

#[derive(Serialize)]
struct SeriesLineRef<'a> {
    metric: &'a Metric,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    values: Vec<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    timestamps: Vec<i64>,
}

#[derive(Deserialize)]
struct SeriesLine {
    metric: Metric,
    #[serde(default)]
    values: Vec<f64>,
    #[serde(default)]
    timestamps: Vec<i64>,
}

impl Serialize for Series {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        SeriesLineRef {
            metric: &self.metric,
            values: self.samples.iter().map(|sample| sample.value).collect(),
            timestamps: self
                .samples
                .iter()
                .map(|sample| sample.timestamp.timestamp_millis())
                .collect(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Series {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let line = SeriesLine::deserialize(deserializer)?;
        series_from_line(line).map_err(D::Error::custom)
    }
}

fn series_from_line(line: SeriesLine) -> Result<Series, CodecError> {
    if line.values.len() != line.timestamps.len() {
        return Err(CodecError::LengthMismatch {
            metric: line.metric.selector(),
            values: line.values.len(),
            timestamps: line.timestamps.len(),
        });
    }
    let samples = line
        .values
        .into_iter()
        .zip(line.timestamps)
        .map(|(value, timestamp_ms)| {
            SyncDateTime::from_unix_milliseconds_i64(timestamp_ms)
                .map(|timestamp| Sample { value, timestamp })
                .ok_or_else(|| CodecError::TimestampOutOfRange {
                    metric: line.metric.selector(),
                    timestamp_ms,
                })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Series {
        metric: line.metric,
        samples,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at_ms(ms: i64) -> SyncDateTime {
        SyncDateTime::from_unix_milliseconds_i64(ms).unwrap()
    }

    fn labelled() -> Metric {
        Metric::new("METRIC")
            .with_label("hello", "world")
            .with_label("banana", "phone")
    }

    fn points() -> Vec<Sample> {
        vec![Sample::new(420.0, at_ms(42001)), Sample::new(430.5, at_ms(43001))]
    }

    fn cases() -> Vec<(&'static str, Series, &'static str)> {
        vec![
            (
                "empty",
                Series::new(Metric::new("METRIC")),
                r#"{"metric":{"__name__":"METRIC"}}"#,
            ),
            (
                "points",
                Series::with_samples(Metric::new("METRIC"), points()),
                r#"{"metric":{"__name__":"METRIC"},"values":[420.0,430.5],"timestamps":[42001,43001]}"#,
            ),
            (
                "labels",
                Series::new(labelled()),
                r#"{"metric":{"__name__":"METRIC","banana":"phone","hello":"world"}}"#,
            ),
            (
                "everything",
                Series::with_samples(labelled(), points()),
                r#"{"metric":{"__name__":"METRIC","banana":"phone","hello":"world"},"values":[420.0,430.5],"timestamps":[42001,43001]}"#,
            ),
        ]
    }

    #[test]
    fn test_encode_series() {
        for (name, series, expected) in cases() {
            assert_eq!(encode_series(&series).unwrap(), expected, "case {}", name);
        }
    }

    #[test]
    fn test_decode_series_roundtrip() {
        for (name, series, _) in cases() {
            let encoded = encode_series(&series).unwrap();
            let decoded = decode_series(&encoded).unwrap();
            assert_eq!(decoded, series, "case {}", name);
        }
    }

    #[test]
    fn test_decode_without_labels_has_no_labels() {
        let decoded = decode_series(r#"{"metric":{"__name__":"m"}}"#).unwrap();
        assert_eq!(decoded.metric, Metric::new("m"));
        assert!(decoded.metric.labels.is_empty());
        assert!(decoded.samples.is_empty());
    }

    #[test]
    fn test_decode_integer_values() {
        let decoded =
            decode_series(r#"{"metric":{"__name__":"m"},"values":[1,2],"timestamps":[1000,2000]}"#)
                .unwrap();
        assert_eq!(decoded.samples[1], Sample::new(2.0, at_ms(2000)));
    }

    #[test]
    fn test_decode_length_mismatch() {
        let result =
            decode_series(r#"{"metric":{"__name__":"m"},"values":[1,2],"timestamps":[1000]}"#);
        assert!(matches!(
            result,
            Err(CodecError::LengthMismatch {
                values: 2,
                timestamps: 1,
                ..
            })
        ));
    }

    #[test]
    fn test_decode_timestamp_out_of_range() {
        let result = decode_series(
            r#"{"metric":{"__name__":"m"},"values":[1],"timestamps":[9223372036854775807]}"#,
        );
        assert!(matches!(
            result,
            Err(CodecError::TimestampOutOfRange { .. })
        ));
    }

    #[test]
    fn test_decode_malformed() {
        assert!(matches!(decode_series("{"), Err(CodecError::Json(_))));
        assert!(matches!(
            decode_series(r#"{"values":[1],"timestamps":[1]}"#),
            Err(CodecError::Json(_))
        ));
    }

    #[test]
    fn test_name_label_is_not_duplicated() {
        let metric = Metric::new("real").with_label(NAME_LABEL, "shadow");
        let encoded = encode_series(&Series::new(metric)).unwrap();
        assert_eq!(encoded, r#"{"metric":{"__name__":"real"}}"#);
    }

    #[test]
    fn test_write_series_lines() {
        let mut output = Vec::new();
        let series = vec![
            Series::new(Metric::new("a")),
            Series::with_samples(Metric::new("b"), points()),
        ];
        write_series_lines(&mut output, &series).unwrap();
        let output = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(output.ends_with('\n'));
        assert_eq!(decode_series(lines[1]).unwrap(), series[1]);
    }
}
