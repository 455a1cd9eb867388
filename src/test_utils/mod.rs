//! In-memory stand-ins for the usage API and the store.

pub mod fake_api;
pub mod memory_storage;

pub use fake_api::FakeUsageApi;
pub use memory_storage::MemoryStorage;
