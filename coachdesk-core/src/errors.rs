use thiserror::Error as ThisError;

/// The single failure surfaced by workout plan generation. The payload is
/// diagnostic detail for logs; callers should not branch on it.
#[derive(Debug, ThisError)]
pub enum GenerationError {
    #[error("workout generation failed: {0}")]
    GenerationFailed(String),
}

impl From<anyhow::Error> for GenerationError {
    fn from(e: anyhow::Error) -> Self {
        GenerationError::GenerationFailed(e.to_string())
    }
}

impl From<serde_json::Error> for GenerationError {
    fn from(e: serde_json::Error) -> Self {
        GenerationError::GenerationFailed(e.to_string())
    }
}
