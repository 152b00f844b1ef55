//! JSON values in LocalStorage
//!
//! Natively there is no storage: loads find nothing and saves succeed
//! without writing, so headless runs start from defaults every time.

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("local storage is not available")]
    Unavailable,

    #[error("local storage access failed: {0}")]
    Access(String),

    #[error("stored value is malformed: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(target_arch = "wasm32")]
fn local_storage() -> Result<web_sys::Storage, StorageError> {
    web_sys::window()
        .ok_or(StorageError::Unavailable)?
        .local_storage()
        .map_err(|e| StorageError::Access(format!("{e:?}")))?
        .ok_or(StorageError::Unavailable)
}

/// Read and parse the value stored under `key`
#[cfg(target_arch = "wasm32")]
pub fn load<T: DeserializeOwned>(key: &str) -> Result<Option<T>, StorageError> {
    let raw = local_storage()?
        .get_item(key)
        .map_err(|e| StorageError::Access(format!("{e:?}")))?;
    match raw {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

/// Serialize `value` under `key`
#[cfg(target_arch = "wasm32")]
pub fn save<T: Serialize>(key: &str, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_string(value)?;
    local_storage()?
        .set_item(key, &json)
        .map_err(|e| StorageError::Access(format!("{e:?}")))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn load<T: DeserializeOwned>(_key: &str) -> Result<Option<T>, StorageError> {
    Ok(None)
}

#[cfg(not(target_arch = "wasm32"))]
pub fn save<T: Serialize>(_key: &str, value: &T) -> Result<(), StorageError> {
    // Still catch values that could never be stored
    serde_json::to_string(value)?;
    Ok(())
}
