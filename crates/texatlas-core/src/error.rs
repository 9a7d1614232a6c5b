use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtlasError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Metadata error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to load {class} page {index}: {reason}")]
    PageLoad {
        class: &'static str,
        index: usize,
        reason: String,
    },
}

pub type Result<T> = std::result::Result<T, AtlasError>;
