//! Platform abstraction layer
//!
//! Browser/native differences live behind these modules:
//! - Storage (LocalStorage on web, nothing natively)

pub mod storage;

pub use storage::StorageError;
