use thiserror::Error;

/// Structured error taxonomy for the verification core. Every failure is a
/// distinct, inspectable value; the core never falls back to a default
/// decision.
#[derive(Debug, Clone, Error)]
pub enum DomainError {
    #[error("audio decode failed: {0}")]
    Decode(String),

    #[error("embedding model failed: {0}")]
    Model(String),

    #[error("enrollment requires at least one audio sample")]
    EmptyEnrollment,

    #[error("cosine similarity is undefined for a zero-norm embedding")]
    DegenerateEmbedding,

    #[error("similarity threshold {0} is outside [-1, 1]")]
    InvalidThreshold(f64),

    #[error("no enrollment profile available; enroll a speaker first")]
    ProfileNotReady,

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn decode(message: impl Into<String>) -> Self {
        DomainError::Decode(message.into())
    }

    pub fn model(message: impl Into<String>) -> Self {
        DomainError::Model(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        DomainError::Internal(message.into())
    }
}
