use thiserror::Error;

#[derive(Debug, Error)]
pub enum PriorityError {
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Arithmetic overflow in {context}")]
    Overflow { context: String },

    #[error("Invalid weight configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PriorityError {
    fn from(e: serde_json::Error) -> Self {
        PriorityError::SerializationError(e.to_string())
    }
}
