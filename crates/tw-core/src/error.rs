use thiserror::Error;

#[derive(Debug, Error)]
pub enum TwError {
    #[error("Geometry error: {0}")]
    Geometry(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to load asset '{url}': {reason}")]
    AssetLoad { url: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl TwError {
    pub fn asset_load(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::AssetLoad {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TwError>;
