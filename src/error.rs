use thiserror::Error;

pub type Result<T> = std::result::Result<T, RainError>;

#[derive(Debug, Error)]
pub enum RainError {
    #[error("invalid configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A required browser object (window, document, canvas, 2d context) is missing.
    #[error("dom: {0}")]
    Dom(String),

    #[error("failed to schedule frame: {0}")]
    Schedule(String),
}
