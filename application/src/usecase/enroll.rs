use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use speaker_domain::{
    aggregate_profile, AudioDecoderPort, AudioSource, AudioTransformPort, DomainError, Embedding,
    EmbeddingPort,
};

use crate::{ApplicationError, EnrollSpeakerRequest, EnrollSpeakerResponse, ProfileStore};

const SUPPORTED_EXTENSIONS: [&str; 2] = ["wav", "mp3"];

/// What to do when one enrollment sample cannot be processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnrollmentFailurePolicy {
    /// First failure aborts the whole enrollment.
    #[default]
    Strict,
    /// Bad samples are skipped with a warning; all samples failing still
    /// leaves an empty enrollment error.
    Skip,
}

impl EnrollmentFailurePolicy {
    pub fn parse(value: &str) -> Result<Self, ApplicationError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(EnrollmentFailurePolicy::Strict),
            "skip" => Ok(EnrollmentFailurePolicy::Skip),
            other => Err(ApplicationError::Validation(format!(
                "unknown enrollment failure policy `{other}` (expected `strict` or `skip`)"
            ))),
        }
    }
}

#[async_trait]
pub trait EnrollSpeakerUseCase: Send + Sync {
    async fn enroll(
        &self,
        request: EnrollSpeakerRequest,
    ) -> Result<EnrollSpeakerResponse, ApplicationError>;
}

pub struct EnrollSpeakerUseCaseImpl {
    decoder: Arc<dyn AudioDecoderPort>,
    transform: Arc<dyn AudioTransformPort>,
    embedding: Arc<dyn EmbeddingPort>,
    store: Arc<ProfileStore>,
    failure_policy: EnrollmentFailurePolicy,
    enrollment_dir: Option<PathBuf>,
}

impl EnrollSpeakerUseCaseImpl {
    pub fn new(
        decoder: Arc<dyn AudioDecoderPort>,
        transform: Arc<dyn AudioTransformPort>,
        embedding: Arc<dyn EmbeddingPort>,
        store: Arc<ProfileStore>,
        failure_policy: EnrollmentFailurePolicy,
        enrollment_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            decoder,
            transform,
            embedding,
            store,
            failure_policy,
            enrollment_dir,
        }
    }

    fn resolve_sources(
        &self,
        requested: Option<Vec<String>>,
    ) -> Result<Vec<AudioSource>, ApplicationError> {
        if let Some(paths) = requested {
            return Ok(paths
                .into_iter()
                .map(|path| AudioSource::Path(PathBuf::from(path)))
                .collect());
        }

        let Some(dir) = &self.enrollment_dir else {
            return Err(ApplicationError::Validation(
                "no enrollment sources given and no enrollment directory configured".to_string(),
            ));
        };
        scan_enrollment_dir(dir)
    }

    async fn extract_one(&self, source: &AudioSource) -> Result<Embedding, DomainError> {
        let clip = self.decoder.decode(source).await?;
        let clip = self.transform.to_canonical(clip).await?;
        self.embedding.extract(&clip).await
    }
}

#[async_trait]
impl EnrollSpeakerUseCase for EnrollSpeakerUseCaseImpl {
    async fn enroll(
        &self,
        request: EnrollSpeakerRequest,
    ) -> Result<EnrollSpeakerResponse, ApplicationError> {
        let session_id = request
            .session_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let sources = self.resolve_sources(request.sources)?;

        tracing::info!(
            session_id = %session_id,
            source_count = sources.len(),
            policy = ?self.failure_policy,
            "starting speaker enrollment"
        );

        let mut embeddings = Vec::with_capacity(sources.len());
        let mut skipped = 0_usize;
        for source in &sources {
            match self.extract_one(source).await {
                Ok(embedding) => embeddings.push(embedding),
                Err(error) if self.failure_policy == EnrollmentFailurePolicy::Skip => {
                    tracing::warn!(
                        source = %source.describe(),
                        error = %error,
                        "skipping unreadable enrollment sample"
                    );
                    skipped += 1;
                }
                Err(error) => {
                    tracing::error!(
                        source = %source.describe(),
                        error = %error,
                        "enrollment aborted on unreadable sample"
                    );
                    return Err(error.into());
                }
            }
        }

        let profile = aggregate_profile(&embeddings)?;
        let sample_count = profile.sample_count;
        let embedding_dim = profile.embedding_dim();
        self.store.replace(profile)?;

        tracing::info!(
            session_id = %session_id,
            sample_count,
            skipped,
            embedding_dim,
            "speaker enrollment completed"
        );

        Ok(EnrollSpeakerResponse {
            session_id,
            sample_count,
            skipped,
            embedding_dim,
        })
    }
}

/// Every supported audio file in the directory, in path order, each exactly
/// once.
fn scan_enrollment_dir(dir: &Path) -> Result<Vec<AudioSource>, ApplicationError> {
    let entries = std::fs::read_dir(dir).map_err(|err| {
        ApplicationError::Validation(format!(
            "cannot read enrollment directory `{}`: {err}",
            dir.display()
        ))
    })?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| {
            ApplicationError::Internal(format!("failed to list enrollment directory: {err}"))
        })?;
        let path = entry.path();
        let supported = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                SUPPORTED_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false);
        if path.is_file() && supported {
            paths.push(path);
        }
    }
    paths.sort();

    Ok(paths.into_iter().map(AudioSource::Path).collect())
}
