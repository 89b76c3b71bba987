use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("rasterization failed: {0}")]
    Raster(String),
}

pub type Result<T> = std::result::Result<T, Error>;
