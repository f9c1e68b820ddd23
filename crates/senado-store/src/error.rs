use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("watchlist io error at {path}: {source}")]
    Io {
        path: std::path::PathBuf,
        source: std::io::Error,
    },

    #[error("watchlist json error: {0}")]
    Json(#[from] serde_json::Error),
}
