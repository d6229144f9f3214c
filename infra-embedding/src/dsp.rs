//! Short-time spectral analysis shared by the embedding backends.

use std::f32::consts::PI;

use rustfft::num_complex::Complex;
use rustfft::FftPlanner;

pub fn hann_window(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / len as f32).cos())
        .collect()
}

/// Windowed power spectra, one row per frame, `n_fft / 2 + 1` bins each.
/// Returns an empty vec when the clip is shorter than one analysis window.
pub fn power_spectra(
    samples: &[f32],
    n_fft: usize,
    hop_length: usize,
    win_length: usize,
) -> Vec<Vec<f32>> {
    let win_length = win_length.min(n_fft);
    if n_fft == 0 || hop_length == 0 || win_length == 0 || samples.len() < win_length {
        return Vec::new();
    }

    let window = hann_window(win_length);
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n_fft);

    let num_frames = (samples.len() - win_length) / hop_length + 1;
    let bins = n_fft / 2 + 1;
    let mut frames = Vec::with_capacity(num_frames);
    for frame_idx in 0..num_frames {
        let start = frame_idx * hop_length;
        let mut buffer: Vec<Complex<f32>> = (0..n_fft)
            .map(|j| {
                let value = if j < win_length {
                    samples[start + j] * window[j]
                } else {
                    0.0
                };
                Complex::new(value, 0.0)
            })
            .collect();
        fft.process(&mut buffer);
        frames.push(buffer[..bins].iter().map(|c| c.norm_sqr()).collect());
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hann_window_is_symmetric_and_bounded() {
        let window = hann_window(400);
        assert_eq!(window.len(), 400);
        assert!(window[0].abs() < 1e-6);
        for i in 1..window.len() {
            assert!((window[i] - window[window.len() - i]).abs() < 1e-5);
        }
        assert!(window.iter().all(|&w| (0.0..=1.0).contains(&w)));
    }

    #[test]
    fn short_clip_produces_no_frames() {
        assert!(power_spectra(&[0.1; 10], 512, 160, 400).is_empty());
    }

    #[test]
    fn sine_energy_concentrates_near_its_bin() {
        let sample_rate = 16_000.0_f32;
        let freq = 1_000.0_f32;
        let samples: Vec<f32> = (0..16_000)
            .map(|i| (i as f32 * 2.0 * PI * freq / sample_rate).sin())
            .collect();
        let frames = power_spectra(&samples, 512, 160, 400);
        assert!(!frames.is_empty());

        let bins = &frames[frames.len() / 2];
        let peak = bins
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(idx, _)| idx)
            .unwrap_or(0);
        let expected = (freq / (sample_rate / 512.0)).round() as usize;
        assert!(peak.abs_diff(expected) <= 1, "peak {peak} vs {expected}");
    }
}
