use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed status URL: {0}")]
    MalformedUrl(String),

    #[error("Log retrieval failed: {0}")]
    Retrieval(String),

    #[error("AI analysis failed: {0}")]
    Analysis(String),

    #[error("Slack notification failed: {0}")]
    Notification(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Process exit code for this error category, so operators can triage a
    /// failed run from the exit status alone.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Config(_) => 2,
            AppError::MalformedUrl(_) => 3,
            AppError::Retrieval(_) => 4,
            AppError::Analysis(_) => 5,
            AppError::Notification(_) => 6,
            _ => 1,
        }
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
