use async_trait::async_trait;

use crate::{AudioClip, AudioSource, DomainError, Embedding};

/// Turns an audio source into a mono clip at its native sample rate.
#[async_trait]
pub trait AudioDecoderPort: Send + Sync {
    async fn decode(&self, source: &AudioSource) -> Result<AudioClip, DomainError>;
}

/// Brings a clip to the canonical form expected by embedding backends:
/// clamped to [-1, 1] and resampled to the configured sample rate.
#[async_trait]
pub trait AudioTransformPort: Send + Sync {
    async fn to_canonical(&self, clip: AudioClip) -> Result<AudioClip, DomainError>;

    fn canonical_sample_rate_hz(&self) -> u32;
}

/// The external speaker-embedding model, reduced to a single capability.
/// Extraction must be deterministic for identical input.
#[async_trait]
pub trait EmbeddingPort: Send + Sync {
    async fn extract(&self, clip: &AudioClip) -> Result<Embedding, DomainError>;

    fn embedding_dim(&self) -> usize;
}
