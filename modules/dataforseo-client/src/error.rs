use thiserror::Error;

pub type Result<T> = std::result::Result<T, DataForSeoError>;

#[derive(Debug, Error)]
pub enum DataForSeoError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Insufficient account credits")]
    InsufficientCredits,

    #[error("Task error (status {status_code}): {message}")]
    Task { status_code: u32, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}

impl DataForSeoError {
    /// Transient failures are worth one more attempt; everything else
    /// (auth, credits, malformed payloads) fails immediately.
    pub fn is_transient(&self) -> bool {
        match self {
            DataForSeoError::Network(_) => true,
            DataForSeoError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for DataForSeoError {
    fn from(err: reqwest::Error) -> Self {
        DataForSeoError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for DataForSeoError {
    fn from(err: serde_json::Error) -> Self {
        DataForSeoError::Parse(err.to_string())
    }
}
