use speaker_domain::{
    aggregate_profile, cosine_similarity, AudioClip, DomainError, EmbeddingPort,
    VerificationPolicy,
};
use speaker_infra_embedding::SpectralEmbeddingAdapter;

const SAMPLE_RATE: u32 = 16_000;

fn adapter() -> SpectralEmbeddingAdapter {
    SpectralEmbeddingAdapter::new(192, 512, 160, 400).expect("adapter")
}

fn clip(samples: Vec<f32>) -> AudioClip {
    AudioClip {
        sample_rate_hz: SAMPLE_RATE,
        samples,
    }
}

fn sine(freq_hz: f32, amplitude: f32, seconds: f32) -> Vec<f32> {
    let count = (seconds * SAMPLE_RATE as f32) as usize;
    (0..count)
        .map(|i| {
            amplitude * (i as f32 * 2.0 * std::f32::consts::PI * freq_hz / SAMPLE_RATE as f32).sin()
        })
        .collect()
}

/// Deterministic xorshift white noise in [-0.4, 0.4].
fn white_noise(count: usize) -> Vec<f32> {
    let mut state = 0x2545_f491_u32;
    (0..count)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            (state as f32 / u32::MAX as f32 - 0.5) * 0.8
        })
        .collect()
}

#[tokio::test]
async fn extraction_is_deterministic() {
    let adapter = adapter();
    let probe = clip(sine(440.0, 0.5, 1.0));
    let first = adapter.extract(&probe).await.expect("embedding");
    let second = adapter.extract(&probe).await.expect("embedding");
    assert_eq!(first, second);
    assert_eq!(first.dim(), 192);
}

#[tokio::test]
async fn scaled_copies_enroll_to_the_base_direction() {
    let adapter = adapter();
    let base = sine(150.0, 0.6, 2.0);

    // Three enrollment takes: same signal, different amplitudes.
    let mut embeddings = Vec::new();
    for amplitude in [0.3_f32, 0.48, 0.72] {
        let scale = amplitude / 0.6;
        let scaled: Vec<f32> = base.iter().map(|s| s * scale).collect();
        embeddings.push(adapter.extract(&clip(scaled)).await.expect("embedding"));
    }
    let profile = aggregate_profile(&embeddings).expect("profile");

    let probe = adapter.extract(&clip(base)).await.expect("embedding");
    let policy = VerificationPolicy::new(0.75).expect("policy");
    let result = policy.decide(&profile, &probe).expect("decision");

    assert!(result.authorized);
    assert!(
        result.score > 0.99,
        "same-direction probe scored {}",
        result.score
    );
}

#[tokio::test]
async fn white_noise_probe_is_rejected() {
    let adapter = adapter();

    let enrolled = adapter
        .extract(&clip(sine(150.0, 0.6, 2.0)))
        .await
        .expect("embedding");
    let profile = aggregate_profile(std::slice::from_ref(&enrolled)).expect("profile");

    let probe = adapter
        .extract(&clip(white_noise(2 * SAMPLE_RATE as usize)))
        .await
        .expect("embedding");
    let policy = VerificationPolicy::new(0.75).expect("policy");
    let result = policy.decide(&profile, &probe).expect("decision");

    assert!(!result.authorized);
    assert!(
        result.score < 0.5,
        "uncorrelated noise scored {}",
        result.score
    );
}

#[tokio::test]
async fn silent_probe_yields_a_degenerate_embedding() {
    let adapter = adapter();

    // The spectral backend maps digital silence to the exact zero vector, so
    // extraction succeeds and the similarity stage reports the degeneracy.
    let silent = adapter
        .extract(&clip(vec![0.0; SAMPLE_RATE as usize]))
        .await
        .expect("embedding");
    assert!(silent.values().iter().all(|&v| v == 0.0));

    let enrolled = adapter
        .extract(&clip(sine(150.0, 0.6, 1.0)))
        .await
        .expect("embedding");
    let error = cosine_similarity(&enrolled, &silent).expect_err("degenerate");
    assert!(matches!(error, DomainError::DegenerateEmbedding));
}

#[tokio::test]
async fn distinct_tones_are_distinguishable() {
    let adapter = adapter();
    let low = adapter
        .extract(&clip(sine(150.0, 0.5, 1.0)))
        .await
        .expect("embedding");
    let high = adapter
        .extract(&clip(sine(3_000.0, 0.5, 1.0)))
        .await
        .expect("embedding");
    let similarity = cosine_similarity(&low, &high).expect("similarity");
    assert!(similarity < 0.5, "tones far apart scored {similarity}");
}
