use serde::{Deserialize, Serialize};
use validator::Validate;

/// Probe input: exactly one of `samples` or `source_path` must be present.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct VerifySpeakerRequest {
    #[validate(length(min = 1))]
    pub samples: Option<Vec<f32>>,
    #[validate(range(min = 8_000, max = 192_000))]
    pub sample_rate_hz: Option<u32>,
    #[validate(length(min = 1))]
    pub source_path: Option<String>,
    #[validate(length(min = 1, max = 64))]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VerifySpeakerResponse {
    pub session_id: String,
    pub authorized: bool,
    pub score: f64,
    pub threshold: f64,
}
