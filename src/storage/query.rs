use super::StorageError;
use crate::codec::InstantSample;
use crate::datamodel::{Metric, Series};
use serde::Deserialize;
use std::str::FromStr;

/// Interpreted answer of an instant query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Scalar(InstantSample),
    /// One single-sample series per matching metric.
    Vector(Vec<Series>),
}

/// Result type discriminator of the Prometheus query API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultType {
    Matrix,
    Vector,
    Scalar,
    String,
}

impl FromStr for ResultType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "matrix" => Ok(ResultType::Matrix),
            "vector" => Ok(ResultType::Vector),
            "scalar" => Ok(ResultType::Scalar),
            "string" => Ok(ResultType::String),
            _ => Err(format!("Unknown result type: {}", s)),
        }
    }
}

#[derive(Deserialize)]
struct QueryResponse {
    data: QueryData,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryData {
    result_type: String,
    result: serde_json::Value,
}

#[derive(Deserialize)]
struct VectorEntry {
    metric: Metric,
    value: InstantSample,
}

/// Parses the body of `/api/v1/query`.
pub fn parse_query_response(body: &[u8]) -> Result<QueryResult, StorageError> {
    let response: QueryResponse = serde_json::from_slice(body)?;
    let QueryData {
        result_type,
        result,
    } = response.data;

    match result_type.parse::<ResultType>() {
        Ok(ResultType::Scalar) => Ok(QueryResult::Scalar(serde_json::from_value(result)?)),
        Ok(ResultType::Vector) => {
            let entries: Vec<VectorEntry> = serde_json::from_value(result)?;
            Ok(QueryResult::Vector(
                entries
                    .into_iter()
                    .map(|entry| Series::with_samples(entry.metric, vec![entry.value.into_sample()]))
                    .collect(),
            ))
        }
        Ok(ResultType::Matrix) | Ok(ResultType::String) | Err(_) => {
            Err(StorageError::UnsupportedResultType {
                result_type,
                result: result.to_string(),
            })
        }
    }
}
