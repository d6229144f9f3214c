use async_trait::async_trait;

use speaker_domain::{AudioClip, DomainError, Embedding, EmbeddingPort};

use crate::dsp;

/// Deterministic DSP embedding backend: averaged linear band energies of the
/// clip's power spectrum. Serves as the default backend when no model file
/// is configured and as the reference backend in tests.
///
/// Energies are kept linear, so scaling a waveform scales the embedding
/// without changing its direction, and a silent clip yields the zero vector
/// (which the similarity stage reports as degenerate).
pub struct SpectralEmbeddingAdapter {
    embedding_dim: usize,
    n_fft: usize,
    hop_length: usize,
    win_length: usize,
}

impl SpectralEmbeddingAdapter {
    pub fn new(
        embedding_dim: usize,
        n_fft: usize,
        hop_length: usize,
        win_length: usize,
    ) -> Result<Self, DomainError> {
        let bins = n_fft / 2 + 1;
        if embedding_dim == 0 || embedding_dim > bins {
            return Err(DomainError::model(format!(
                "embedding dim {embedding_dim} not supported with {bins} spectrum bins"
            )));
        }
        Ok(Self {
            embedding_dim,
            n_fft,
            hop_length,
            win_length,
        })
    }
}

#[async_trait]
impl EmbeddingPort for SpectralEmbeddingAdapter {
    async fn extract(&self, clip: &AudioClip) -> Result<Embedding, DomainError> {
        let spectra = dsp::power_spectra(
            &clip.samples,
            self.n_fft,
            self.hop_length,
            self.win_length,
        );
        if spectra.is_empty() {
            return Err(DomainError::model(format!(
                "clip too short for analysis: {} samples, window {}",
                clip.samples.len(),
                self.win_length
            )));
        }

        // Time-averaged spectrum.
        let bins = self.n_fft / 2 + 1;
        let mut averaged = vec![0.0_f32; bins];
        for frame in &spectra {
            for (acc, &p) in averaged.iter_mut().zip(frame) {
                *acc += p;
            }
        }
        let frame_count = spectra.len() as f32;
        for acc in &mut averaged {
            *acc /= frame_count;
        }

        // Fold the bins into `embedding_dim` contiguous bands.
        let mut values = vec![0.0_f32; self.embedding_dim];
        for (k, &power) in averaged.iter().enumerate() {
            let band = k * self.embedding_dim / bins;
            values[band.min(self.embedding_dim - 1)] += power;
        }

        Ok(Embedding(values))
    }

    fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }
}
