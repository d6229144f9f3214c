use std::fs::File;
use std::path::Path;

use async_trait::async_trait;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use speaker_domain::{AudioClip, AudioDecoderPort, AudioSource, DomainError};

/// WAV/MP3 file decoding via symphonia. Multi-channel audio is downmixed to
/// mono by per-frame channel mean; the clip keeps its native sample rate.
#[derive(Default)]
pub struct SymphoniaDecoderAdapter;

impl SymphoniaDecoderAdapter {
    pub fn new() -> Self {
        Self
    }

    fn decode_file(&self, path: &Path) -> Result<AudioClip, DomainError> {
        let file = File::open(path).map_err(|err| {
            DomainError::decode(format!("cannot open `{}`: {err}", path.display()))
        })?;
        let stream = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|ext| ext.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                stream,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|err| {
                DomainError::decode(format!("unrecognized audio `{}`: {err}", path.display()))
            })?;
        let mut format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|track| track.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| {
                DomainError::decode(format!("no audio track in `{}`", path.display()))
            })?;
        let track_id = track.id;
        let sample_rate_hz = track
            .codec_params
            .sample_rate
            .ok_or_else(|| DomainError::decode("stream does not declare a sample rate"))?;
        let mut channels = track.codec_params.channels.map(|layout| layout.count());

        let mut decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|err| DomainError::decode(format!("unsupported codec: {err}")))?;

        let mut interleaved: Vec<f32> = Vec::new();
        loop {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(err))
                    if err.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    break;
                }
                Err(SymphoniaError::ResetRequired) => break,
                Err(err) => {
                    return Err(DomainError::decode(format!("packet read failed: {err}")));
                }
            };
            if packet.track_id() != track_id {
                continue;
            }

            let decoded = decoder
                .decode(&packet)
                .map_err(|err| DomainError::decode(format!("packet decode failed: {err}")))?;
            let spec = *decoded.spec();
            channels.get_or_insert_with(|| spec.channels.count());

            let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            buffer.copy_interleaved_ref(decoded);
            interleaved.extend_from_slice(buffer.samples());
        }

        if interleaved.is_empty() {
            return Err(DomainError::decode(format!(
                "no audio frames decoded from `{}`",
                path.display()
            )));
        }

        let channel_count = channels.unwrap_or(1).max(1);
        let samples = downmix_mean(&interleaved, channel_count);
        tracing::debug!(
            path = %path.display(),
            sample_rate_hz,
            channels = channel_count,
            frames = samples.len(),
            "decoded audio file"
        );

        Ok(AudioClip {
            sample_rate_hz,
            samples,
        })
    }
}

#[async_trait]
impl AudioDecoderPort for SymphoniaDecoderAdapter {
    async fn decode(&self, source: &AudioSource) -> Result<AudioClip, DomainError> {
        match source {
            AudioSource::Path(path) => self.decode_file(path),
            AudioSource::Samples {
                samples,
                sample_rate_hz,
            } => Ok(AudioClip {
                sample_rate_hz: *sample_rate_hz,
                samples: samples.clone(),
            }),
        }
    }
}

/// Per-frame channel mean. Interleaved frames with fewer trailing samples
/// than channels still average over what is present.
fn downmix_mean(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downmix_averages_channels_per_frame() {
        let interleaved = [0.2, 0.4, -1.0, 1.0];
        let mono = downmix_mean(&interleaved, 2);
        assert_eq!(mono.len(), 2);
        assert!((mono[0] - 0.3).abs() < 1e-6);
        assert!(mono[1].abs() < 1e-6);
    }

    #[test]
    fn downmix_is_identity_for_mono() {
        let samples = [0.1, -0.2, 0.3];
        assert_eq!(downmix_mean(&samples, 1), samples.to_vec());
    }

    #[tokio::test]
    async fn inline_samples_pass_through() {
        let adapter = SymphoniaDecoderAdapter::new();
        let clip = adapter
            .decode(&AudioSource::Samples {
                samples: vec![0.5, -0.5],
                sample_rate_hz: 22_050,
            })
            .await
            .expect("decode");
        assert_eq!(clip.sample_rate_hz, 22_050);
        assert_eq!(clip.samples, vec![0.5, -0.5]);
    }

    #[tokio::test]
    async fn missing_file_is_a_decode_error() {
        let adapter = SymphoniaDecoderAdapter::new();
        let error = adapter
            .decode(&AudioSource::Path("/nonexistent/probe.wav".into()))
            .await
            .expect_err("must fail");
        assert!(matches!(error, DomainError::Decode(_)));
    }
}
