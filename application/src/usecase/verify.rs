use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use speaker_domain::{
    AudioDecoderPort, AudioSource, AudioTransformPort, EmbeddingPort, VerificationPolicy,
};

use crate::{ApplicationError, ProfileStore, VerifySpeakerRequest, VerifySpeakerResponse};

#[async_trait]
pub trait VerifySpeakerUseCase: Send + Sync {
    async fn verify(
        &self,
        request: VerifySpeakerRequest,
    ) -> Result<VerifySpeakerResponse, ApplicationError>;
}

pub struct VerifySpeakerUseCaseImpl {
    decoder: Arc<dyn AudioDecoderPort>,
    transform: Arc<dyn AudioTransformPort>,
    embedding: Arc<dyn EmbeddingPort>,
    store: Arc<ProfileStore>,
    policy: VerificationPolicy,
}

impl VerifySpeakerUseCaseImpl {
    pub fn new(
        decoder: Arc<dyn AudioDecoderPort>,
        transform: Arc<dyn AudioTransformPort>,
        embedding: Arc<dyn EmbeddingPort>,
        store: Arc<ProfileStore>,
        policy: VerificationPolicy,
    ) -> Self {
        Self {
            decoder,
            transform,
            embedding,
            store,
            policy,
        }
    }

    fn probe_source(&self, request: &VerifySpeakerRequest) -> Result<AudioSource, ApplicationError> {
        match (&request.samples, &request.source_path) {
            (Some(samples), None) => Ok(AudioSource::Samples {
                samples: samples.clone(),
                sample_rate_hz: request
                    .sample_rate_hz
                    .unwrap_or_else(|| self.transform.canonical_sample_rate_hz()),
            }),
            (None, Some(path)) => Ok(AudioSource::Path(PathBuf::from(path))),
            _ => Err(ApplicationError::Validation(
                "provide exactly one of `samples` or `source_path`".to_string(),
            )),
        }
    }
}

#[async_trait]
impl VerifySpeakerUseCase for VerifySpeakerUseCaseImpl {
    async fn verify(
        &self,
        request: VerifySpeakerRequest,
    ) -> Result<VerifySpeakerResponse, ApplicationError> {
        let session_id = request
            .session_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let source = self.probe_source(&request)?;

        tracing::debug!(
            session_id = %session_id,
            source = %source.describe(),
            "starting speaker verification"
        );

        // Resolve the profile before the (potentially slow) model call so a
        // missing enrollment fails fast.
        let profile = self.store.current()?;

        let clip = self.decoder.decode(&source).await?;
        let clip = self.transform.to_canonical(clip).await?;
        let probe = self.embedding.extract(&clip).await?;
        let result = self.policy.decide(&profile, &probe)?;

        tracing::info!(
            session_id = %session_id,
            authorized = result.authorized,
            score = result.score,
            threshold = result.threshold,
            "speaker verification completed"
        );

        Ok(VerifySpeakerResponse {
            session_id,
            authorized: result.authorized,
            score: result.score,
            threshold: result.threshold,
        })
    }
}
