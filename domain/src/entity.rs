use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Mono PCM audio, samples in [-1.0, 1.0].
///
/// Multi-channel input is downmixed by per-frame channel mean at decode time,
/// so every clip that reaches an embedding backend is single-channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioClip {
    pub sample_rate_hz: u32,
    pub samples: Vec<f32>,
}

impl AudioClip {
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate_hz == 0 {
            return 0;
        }
        (self.samples.len() as u64).saturating_mul(1_000) / u64::from(self.sample_rate_hz)
    }
}

/// Where a clip comes from: a file on disk or samples already in memory.
#[derive(Debug, Clone)]
pub enum AudioSource {
    Path(PathBuf),
    Samples { samples: Vec<f32>, sample_rate_hz: u32 },
}

impl AudioSource {
    /// Short description used in logs and error messages.
    pub fn describe(&self) -> String {
        match self {
            AudioSource::Path(path) => path.display().to_string(),
            AudioSource::Samples { samples, .. } => format!("<{} inline samples>", samples.len()),
        }
    }
}

/// Fixed-length voice embedding. The dimension is set by the backend that
/// produced it; embeddings from different backends are not comparable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Embedding(pub Vec<f32>);

impl Embedding {
    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn values(&self) -> &[f32] {
        &self.0
    }
}

/// Aggregated voiceprint of one enrolled speaker: the component-wise mean of
/// the embeddings of every enrollment sample. Never mutated in place;
/// re-enrollment builds a fresh profile and swaps it in wholesale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentProfile {
    pub embedding: Embedding,
    pub sample_count: usize,
}

impl EnrollmentProfile {
    pub fn embedding_dim(&self) -> usize {
        self.embedding.dim()
    }
}

/// Outcome of scoring one probe against a profile.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VerificationResult {
    pub authorized: bool,
    pub score: f64,
    pub threshold: f64,
}
