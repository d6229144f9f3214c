use std::path::PathBuf;
use std::sync::Mutex;

use async_trait::async_trait;
use candle_core::{DType, Device, Module, Tensor, D};
use candle_nn::{conv1d, linear, Conv1d, Conv1dConfig, Linear, VarBuilder};

use speaker_domain::{AudioClip, DomainError, Embedding, EmbeddingPort};

use crate::fbank::MelFilterbank;

const FRAME_CHANNELS: [usize; 3] = [512, 512, 512];
const PRE_POOL_CHANNELS: usize = 1_500;

#[derive(Debug, Clone)]
pub struct TdnnAdapterConfig {
    pub model_path: String,
    pub embedding_dim: usize,
    pub n_mels: usize,
    pub n_fft: usize,
    pub hop_length: usize,
    pub win_length: usize,
}

/// Candle x-vector style speaker encoder: log-mel filterbank, a small TDNN
/// convolution stack, mean+std statistics pooling and a linear projection to
/// the embedding dimension. Weights come from a safetensors checkpoint and
/// are loaded lazily on first use; a missing or malformed checkpoint
/// surfaces as a model error, never a panic.
pub struct TdnnEmbeddingAdapter {
    config: TdnnAdapterConfig,
    device: Device,
    runtime: Mutex<Option<TdnnEncoder>>,
}

struct TdnnEncoder {
    frame_layers: Vec<Conv1d>,
    embedding: Linear,
}

impl TdnnEncoder {
    fn load(config: &TdnnAdapterConfig, device: &Device) -> Result<Self, DomainError> {
        let path = PathBuf::from(&config.model_path);
        let tensors = candle_core::safetensors::load(&path, device).map_err(|err| {
            DomainError::model(format!(
                "failed to load weights `{}`: {err}",
                path.display()
            ))
        })?;
        let vb = VarBuilder::from_tensors(tensors, DType::F32, device);

        let mut frame_layers = Vec::new();
        let mut in_channels = config.n_mels;
        for (index, &out_channels) in FRAME_CHANNELS.iter().enumerate() {
            let kernel = if index == 0 { 5 } else { 3 };
            let conv = conv1d(
                in_channels,
                out_channels,
                kernel,
                Conv1dConfig {
                    padding: kernel / 2,
                    ..Default::default()
                },
                vb.pp(format!("frame.{index}")),
            )
            .map_err(|err| DomainError::model(format!("frame layer {index}: {err}")))?;
            frame_layers.push(conv);
            in_channels = out_channels;
        }
        let pre_pool = conv1d(
            in_channels,
            PRE_POOL_CHANNELS,
            1,
            Conv1dConfig::default(),
            vb.pp("pre_pool"),
        )
        .map_err(|err| DomainError::model(format!("pre-pool layer: {err}")))?;
        frame_layers.push(pre_pool);

        let embedding = linear(
            2 * PRE_POOL_CHANNELS,
            config.embedding_dim,
            vb.pp("embedding"),
        )
        .map_err(|err| DomainError::model(format!("embedding layer: {err}")))?;

        Ok(Self {
            frame_layers,
            embedding,
        })
    }

    /// `features` is (1, n_mels, frames); the output is the embedding vector.
    fn forward(&self, features: &Tensor) -> Result<Vec<f32>, candle_core::Error> {
        let mut x = features.clone();
        for layer in &self.frame_layers {
            x = layer.forward(&x)?.relu()?;
        }

        // Statistics pooling over time: mean and standard deviation.
        let mean = x.mean(D::Minus1)?;
        let var = (x.sqr()?.mean(D::Minus1)? - mean.sqr()?)?.maximum(0.0)?;
        let std = var.affine(1.0, 1e-5)?.sqrt()?;
        let pooled = Tensor::cat(&[&mean, &std], D::Minus1)?;

        let projected = self.embedding.forward(&pooled)?;
        projected.squeeze(0)?.to_vec1::<f32>()
    }
}

impl TdnnEmbeddingAdapter {
    pub fn new(config: TdnnAdapterConfig) -> Self {
        Self {
            config,
            device: Device::Cpu,
            runtime: Mutex::new(None),
        }
    }

    fn extract_blocking(&self, clip: &AudioClip) -> Result<Embedding, DomainError> {
        let filterbank = MelFilterbank::new(
            self.config.n_fft,
            self.config.n_mels,
            clip.sample_rate_hz,
        );
        let (features, frames) = filterbank.log_mel(
            &clip.samples,
            self.config.n_fft,
            self.config.hop_length,
            self.config.win_length,
        );
        if frames == 0 {
            return Err(DomainError::model(format!(
                "clip too short for analysis: {} samples, window {}",
                clip.samples.len(),
                self.config.win_length
            )));
        }

        let mut runtime = self
            .runtime
            .lock()
            .map_err(|_| DomainError::internal("tdnn runtime lock poisoned"))?;
        if runtime.is_none() {
            tracing::info!(
                model_path = %self.config.model_path,
                embedding_dim = self.config.embedding_dim,
                "loading TDNN speaker encoder"
            );
            *runtime = Some(TdnnEncoder::load(&self.config, &self.device)?);
        }
        let encoder = runtime
            .as_ref()
            .ok_or_else(|| DomainError::internal("tdnn encoder unavailable"))?;

        let input = Tensor::from_vec(features, (1, self.config.n_mels, frames), &self.device)
            .map_err(|err| DomainError::model(format!("feature tensor: {err}")))?;
        let values = encoder
            .forward(&input)
            .map_err(|err| DomainError::model(format!("encoder forward pass: {err}")))?;
        Ok(Embedding(values))
    }
}

#[async_trait]
impl EmbeddingPort for TdnnEmbeddingAdapter {
    async fn extract(&self, clip: &AudioClip) -> Result<Embedding, DomainError> {
        self.extract_blocking(clip)
    }

    fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }
}
