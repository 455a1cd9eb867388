use super::{QueryResult, StorageError};
use crate::datamodel::Series;
use async_trait::async_trait;
use std::fmt::Debug;

#[async_trait]
pub trait StorageInstance: Send + Sync + Debug {
    /// Appends the series to the store. One call is one import request.
    async fn push(&self, series: &[Series]) -> Result<(), StorageError>;

    /// Runs an instant query.
    async fn query(&self, query: &str) -> Result<QueryResult, StorageError>;
}
