use crate::datamodel::Series;
use crate::storage::{QueryResult, StorageError, StorageInstance};
use async_trait::async_trait;
use std::sync::Mutex;

/// Store keeping every push in memory and answering queries with a canned result.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    pushes: Vec<Vec<Series>>,
    queries: Vec<String>,
    query_result: Option<QueryResult>,
    fail_queries: bool,
    fail_pushes: bool,
}

impl MemoryStorage {
    /// One entry per push call.
    pub fn pushes(&self) -> Vec<Vec<Series>> {
        self.state.lock().unwrap().pushes.clone()
    }

    /// Number of samples in each push.
    pub fn push_sizes(&self) -> Vec<usize> {
        self.pushes()
            .iter()
            .map(|push| push.iter().map(Series::len).sum())
            .collect()
    }

    pub fn queries(&self) -> Vec<String> {
        self.state.lock().unwrap().queries.clone()
    }

    /// Answer to every following query. An empty vector by default.
    pub fn set_query_result(&self, result: QueryResult) {
        self.state.lock().unwrap().query_result = Some(result);
    }

    pub fn fail_queries(&self) {
        self.state.lock().unwrap().fail_queries = true;
    }

    pub fn fail_pushes(&self) {
        self.state.lock().unwrap().fail_pushes = true;
    }
}

#[async_trait]
impl StorageInstance for MemoryStorage {
    async fn push(&self, series: &[Series]) -> Result<(), StorageError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_pushes {
            return Err(StorageError::Status {
                endpoint: "/api/v1/import".to_string(),
                status: 503,
                body: "unavailable".to_string(),
            });
        }
        state.pushes.push(series.to_vec());
        Ok(())
    }

    async fn query(&self, query: &str) -> Result<QueryResult, StorageError> {
        let mut state = self.state.lock().unwrap();
        state.queries.push(query.to_string());
        if state.fail_queries {
            return Err(StorageError::Status {
                endpoint: "/api/v1/query".to_string(),
                status: 422,
                body: "cannot parse query".to_string(),
            });
        }
        Ok(state
            .query_result
            .clone()
            .unwrap_or(QueryResult::Vector(Vec::new())))
    }
}
