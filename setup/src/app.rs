use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Error};

use speaker_application::{
    EnrollSpeakerRequest, EnrollSpeakerUseCase, EnrollSpeakerUseCaseImpl, EnrollmentFailurePolicy,
    ProfileStore, VerifySpeakerUseCase, VerifySpeakerUseCaseImpl,
};
use speaker_configuration::{AppConfig, EmbeddingRuntimeConfig, ServerConfig};
use speaker_domain::{
    AudioDecoderPort, AudioTransformPort, EmbeddingPort, VerificationPolicy,
};
use speaker_http_server::{create_app_routes, AppState};
use speaker_infra_audio::{RubatoTransformAdapter, SymphoniaDecoderAdapter};
use speaker_infra_embedding::{SpectralEmbeddingAdapter, TdnnAdapterConfig, TdnnEmbeddingAdapter};

pub async fn build_and_run(config: AppConfig, server_config: ServerConfig) -> Result<(), Error> {
    let app = Application::new(config).await?;
    app.run(server_config).await
}

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

impl Application {
    pub async fn new(config: AppConfig) -> Result<Self, Error> {
        tracing::info!(
            sample_rate_hz = config.service.audio.sample_rate_hz,
            threshold = config.service.verification.threshold,
            backend = %config.service.embedding.backend,
            "initializing speaker verification application"
        );

        let decoder: Arc<dyn AudioDecoderPort> = Arc::new(SymphoniaDecoderAdapter::new());
        let transform: Arc<dyn AudioTransformPort> = Arc::new(RubatoTransformAdapter::new(
            config.service.audio.sample_rate_hz,
        ));
        let embedding = build_embedding_backend(&config.service.embedding)?;
        let store = Arc::new(ProfileStore::new());

        let failure_policy =
            EnrollmentFailurePolicy::parse(&config.service.verification.on_error)
                .map_err(|err| anyhow!("invalid enrollment policy: {err}"))?;
        let policy = VerificationPolicy::new(config.service.verification.threshold)
            .map_err(|err| anyhow!("invalid verification threshold: {err}"))?;

        let enrollment_dir = config
            .service
            .verification
            .enrollment_dir
            .as_ref()
            .map(PathBuf::from);

        let enroll_usecase: Arc<dyn EnrollSpeakerUseCase> = Arc::new(EnrollSpeakerUseCaseImpl::new(
            decoder.clone(),
            transform.clone(),
            embedding.clone(),
            store.clone(),
            failure_policy,
            enrollment_dir.clone(),
        ));
        let verify_usecase: Arc<dyn VerifySpeakerUseCase> = Arc::new(VerifySpeakerUseCaseImpl::new(
            decoder,
            transform,
            embedding,
            store.clone(),
            policy,
        ));

        enroll_at_startup(enroll_usecase.as_ref(), enrollment_dir.as_deref()).await;

        let state = AppState::new(enroll_usecase, verify_usecase, store);
        Ok(Self { config, state })
    }

    pub async fn run(self, server_config: ServerConfig) -> Result<(), Error> {
        create_app_routes(self.state, &server_config.host, server_config.port)
            .await
            .map_err(|err| anyhow!("http server failed: {err}"))
    }
}

fn build_embedding_backend(
    config: &EmbeddingRuntimeConfig,
) -> Result<Arc<dyn EmbeddingPort>, Error> {
    match config.backend.trim().to_ascii_lowercase().as_str() {
        "tdnn" => {
            let model_path = config.model_path.clone().ok_or_else(|| {
                anyhow!("`service.embedding.model_path` is required for the tdnn backend")
            })?;
            Ok(Arc::new(TdnnEmbeddingAdapter::new(TdnnAdapterConfig {
                model_path,
                embedding_dim: config.embedding_dim,
                n_mels: config.n_mels,
                n_fft: config.n_fft,
                hop_length: config.hop_length,
                win_length: config.win_length,
            })))
        }
        "spectral" => {
            let adapter = SpectralEmbeddingAdapter::new(
                config.embedding_dim,
                config.n_fft,
                config.hop_length,
                config.win_length,
            )
            .map_err(|err| anyhow!("spectral backend: {err}"))?;
            Ok(Arc::new(adapter))
        }
        other => Err(anyhow!(
            "unknown embedding backend `{other}` (expected `spectral` or `tdnn`)"
        )),
    }
}

/// Best effort: a missing or unreadable enrollment directory leaves the
/// service up with no profile, and verification fails with a clear error
/// until an explicit enrollment succeeds.
async fn enroll_at_startup(
    enroll: &dyn EnrollSpeakerUseCase,
    enrollment_dir: Option<&std::path::Path>,
) {
    let Some(dir) = enrollment_dir else {
        tracing::info!("no enrollment directory configured; waiting for explicit enrollment");
        return;
    };
    if !dir.is_dir() {
        tracing::warn!(
            dir = %dir.display(),
            "enrollment directory does not exist; waiting for explicit enrollment"
        );
        return;
    }

    match enroll.enroll(EnrollSpeakerRequest::default()).await {
        Ok(response) => tracing::info!(
            sample_count = response.sample_count,
            skipped = response.skipped,
            embedding_dim = response.embedding_dim,
            "authorized speaker enrolled at startup"
        ),
        Err(error) => tracing::warn!(
            error = %error,
            "startup enrollment failed; verification will report a missing profile"
        ),
    }
}
