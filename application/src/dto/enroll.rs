use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct EnrollSpeakerRequest {
    /// Audio file paths to enroll from. When omitted, the configured
    /// enrollment directory is scanned instead.
    #[validate(length(min = 1))]
    pub sources: Option<Vec<String>>,
    #[validate(length(min = 1, max = 64))]
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EnrollSpeakerResponse {
    pub session_id: String,
    /// Samples that contributed to the profile.
    pub sample_count: usize,
    /// Samples skipped under the lenient failure policy.
    pub skipped: usize,
    pub embedding_dim: usize,
}
