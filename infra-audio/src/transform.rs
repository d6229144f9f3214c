use async_trait::async_trait;
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};

use speaker_domain::{AudioClip, AudioTransformPort, DomainError};

/// Canonicalizes clips for embedding extraction: clamps samples to [-1, 1]
/// and resamples to the configured rate with a windowed-sinc resampler.
pub struct RubatoTransformAdapter {
    target_sample_rate_hz: u32,
}

impl RubatoTransformAdapter {
    pub fn new(target_sample_rate_hz: u32) -> Self {
        Self {
            target_sample_rate_hz,
        }
    }

    fn resample(&self, samples: &[f32], from_hz: u32) -> Result<Vec<f32>, DomainError> {
        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };

        let mut resampler = SincFixedIn::<f32>::new(
            f64::from(self.target_sample_rate_hz) / f64::from(from_hz),
            2.0,
            params,
            samples.len(),
            1,
        )
        .map_err(|err| DomainError::decode(format!("resampler init failed: {err}")))?;

        let waves_in = vec![samples.to_vec()];
        let waves_out = resampler
            .process(&waves_in, None)
            .map_err(|err| DomainError::decode(format!("resampling failed: {err}")))?;

        Ok(waves_out.into_iter().next().unwrap_or_default())
    }
}

#[async_trait]
impl AudioTransformPort for RubatoTransformAdapter {
    async fn to_canonical(&self, clip: AudioClip) -> Result<AudioClip, DomainError> {
        if clip.samples.is_empty() {
            return Err(DomainError::decode("clip contains no samples"));
        }

        let mut samples = clip.samples;
        for sample in &mut samples {
            *sample = sample.clamp(-1.0, 1.0);
        }

        if clip.sample_rate_hz == self.target_sample_rate_hz {
            return Ok(AudioClip {
                sample_rate_hz: clip.sample_rate_hz,
                samples,
            });
        }

        tracing::debug!(
            from_hz = clip.sample_rate_hz,
            to_hz = self.target_sample_rate_hz,
            frames = samples.len(),
            "resampling clip to canonical rate"
        );
        let resampled = self.resample(&samples, clip.sample_rate_hz)?;
        Ok(AudioClip {
            sample_rate_hz: self.target_sample_rate_hz,
            samples: resampled,
        })
    }

    fn canonical_sample_rate_hz(&self) -> u32 {
        self.target_sample_rate_hz
    }
}
