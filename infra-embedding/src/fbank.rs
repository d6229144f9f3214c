//! Log-mel filterbank features for the TDNN encoder.

use crate::dsp;

fn hz_to_mel(hz: f32) -> f32 {
    2_595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10.0_f32.powf(mel / 2_595.0) - 1.0)
}

pub struct MelFilterbank {
    n_mels: usize,
    filters: Vec<Vec<f32>>,
}

impl MelFilterbank {
    /// Triangular filters spanning [0, sample_rate / 2].
    pub fn new(n_fft: usize, n_mels: usize, sample_rate_hz: u32) -> Self {
        let bins = n_fft / 2 + 1;
        let fmax = sample_rate_hz as f32 / 2.0;
        let mel_max = hz_to_mel(fmax);

        // Band edges, evenly spaced on the mel scale.
        let edges: Vec<f32> = (0..n_mels + 2)
            .map(|i| {
                let hz = mel_to_hz(mel_max * i as f32 / (n_mels + 1) as f32);
                hz * n_fft as f32 / sample_rate_hz as f32
            })
            .collect();

        let mut filters = Vec::with_capacity(n_mels);
        for m in 0..n_mels {
            let (left, center, right) = (edges[m], edges[m + 1], edges[m + 2]);
            let mut filter = vec![0.0_f32; bins];
            for (k, weight) in filter.iter_mut().enumerate() {
                let k = k as f32;
                if k > left && k < center {
                    *weight = (k - left) / (center - left);
                } else if (k - center).abs() < f32::EPSILON {
                    *weight = 1.0;
                } else if k > center && k < right {
                    *weight = (right - k) / (right - center);
                }
            }
            filters.push(filter);
        }

        Self { n_mels, filters }
    }

    pub fn n_mels(&self) -> usize {
        self.n_mels
    }

    /// Log-mel features flattened mel-major: `flat[m * frames + t]`.
    /// Returns `(features, frame_count)`; zero frames means the clip is
    /// shorter than one analysis window.
    pub fn log_mel(
        &self,
        samples: &[f32],
        n_fft: usize,
        hop_length: usize,
        win_length: usize,
    ) -> (Vec<f32>, usize) {
        let spectra = dsp::power_spectra(samples, n_fft, hop_length, win_length);
        let frames = spectra.len();
        if frames == 0 {
            return (Vec::new(), 0);
        }

        let mut features = vec![0.0_f32; self.n_mels * frames];
        for (t, power) in spectra.iter().enumerate() {
            for (m, filter) in self.filters.iter().enumerate() {
                let energy: f32 = filter
                    .iter()
                    .zip(power)
                    .map(|(w, p)| w * p)
                    .sum();
                features[m * frames + t] = (energy + 1e-10).ln();
            }
        }
        (features, frames)
    }
}
