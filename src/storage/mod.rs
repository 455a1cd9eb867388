pub mod error;
pub mod query;
pub mod resume;
pub mod storage;
pub mod storage_factory;
pub mod victoria_metrics;

pub use error::StorageError;
pub use query::{QueryResult, ResultType};
pub use resume::{ResumeError, resolve_resume_point};
pub use storage::StorageInstance;
pub use victoria_metrics::VictoriaMetricsStorage;
