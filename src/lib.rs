#![forbid(unsafe_code)]

pub mod atom;
pub mod codec;
pub mod config;
pub mod credentials;
pub mod datamodel;
pub mod export;
pub mod storage;
pub mod vue;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
