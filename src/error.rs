use thiserror::Error;

/// Failures of the on-device key-value store. None of them are fatal: callers
/// log them and keep their in-memory state.
#[derive(Error, Debug)]
pub enum StorageError {
    /// No `localStorage` (private mode, non-browser host).
    #[error("storage unavailable")]
    Unavailable,

    /// The backend rejected a read or write.
    #[error("storage backend error: {0}")]
    Backend(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<wasm_bindgen::JsValue> for StorageError {
    fn from(err: wasm_bindgen::JsValue) -> Self {
        StorageError::Backend(format!("{err:?}"))
    }
}
