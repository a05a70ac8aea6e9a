use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Integrity violation: {0}")]
    Integrity(String),

    #[error("Store backend unavailable: {0}")]
    Unavailable(String),
}
