use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoolAnalyticsError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Degenerate input: {field} — {reason}")]
    DegenerateInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PoolAnalyticsError {
    fn from(e: serde_json::Error) -> Self {
        PoolAnalyticsError::SerializationError(e.to_string())
    }
}
