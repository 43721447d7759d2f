//! Global error type.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Template(#[from] crate::template::Error),

    #[error("{0}")]
    Cache(#[from] crate::cache::Error),

    #[error("component \"{0}\" not found")]
    SchemaNotFound(String),

    #[error("batch of {size} slugs exceeds the maximum of {max}")]
    BatchSizeExceeded { size: usize, max: usize },

    #[error("{0}")]
    Config(#[from] crate::config::Error),
}
