use crate::{DomainError, Embedding, EnrollmentProfile, VerificationResult};

/// Cosine similarity between two embeddings, accumulated in f64.
///
/// Either input having zero norm makes the similarity undefined and is
/// reported as `DegenerateEmbedding` rather than a NaN score.
pub fn cosine_similarity(a: &Embedding, b: &Embedding) -> Result<f64, DomainError> {
    if a.dim() != b.dim() {
        return Err(DomainError::model(format!(
            "embedding dimension mismatch: {} vs {}",
            a.dim(),
            b.dim()
        )));
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (&x, &y) in a.values().iter().zip(b.values()) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a <= 0.0 || norm_b <= 0.0 || !norm_a.is_finite() || !norm_b.is_finite() {
        return Err(DomainError::DegenerateEmbedding);
    }

    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Component-wise arithmetic mean of a non-empty set of embeddings.
/// Inclusion order does not matter; every embedding counts exactly once.
pub fn mean_embedding(embeddings: &[Embedding]) -> Result<Embedding, DomainError> {
    let Some(first) = embeddings.first() else {
        return Err(DomainError::EmptyEnrollment);
    };

    let dim = first.dim();
    let mut sums = vec![0.0_f64; dim];
    for embedding in embeddings {
        if embedding.dim() != dim {
            return Err(DomainError::model(format!(
                "embedding dimension mismatch: {} vs {}",
                embedding.dim(),
                dim
            )));
        }
        for (sum, &value) in sums.iter_mut().zip(embedding.values()) {
            *sum += f64::from(value);
        }
    }

    let count = embeddings.len() as f64;
    Ok(Embedding(sums.into_iter().map(|s| (s / count) as f32).collect()))
}

/// Builds an `EnrollmentProfile` from the embeddings of every enrollment
/// sample.
pub fn aggregate_profile(embeddings: &[Embedding]) -> Result<EnrollmentProfile, DomainError> {
    let embedding = mean_embedding(embeddings)?;
    Ok(EnrollmentProfile {
        embedding,
        sample_count: embeddings.len(),
    })
}

/// Renders the accept/reject decision for a probe embedding against a
/// profile. Pure function of its inputs.
#[derive(Debug, Clone, Copy)]
pub struct VerificationPolicy {
    threshold: f64,
}

impl VerificationPolicy {
    pub fn new(threshold: f64) -> Result<Self, DomainError> {
        if !threshold.is_finite() || !(-1.0..=1.0).contains(&threshold) {
            return Err(DomainError::InvalidThreshold(threshold));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Decision boundary is inclusive: `score >= threshold` authorizes.
    pub fn decide(
        &self,
        profile: &EnrollmentProfile,
        probe: &Embedding,
    ) -> Result<VerificationResult, DomainError> {
        let score = cosine_similarity(&profile.embedding, probe)?;
        Ok(VerificationResult {
            authorized: score >= self.threshold,
            score,
            threshold: self.threshold,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_of(embedding: Embedding) -> EnrollmentProfile {
        EnrollmentProfile {
            embedding,
            sample_count: 1,
        }
    }

    #[test]
    fn cosine_of_vector_with_itself_is_one() {
        let e = Embedding(vec![0.3, -1.2, 4.5, 0.01]);
        let similarity = cosine_similarity(&e, &e).expect("similarity");
        assert!((similarity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_is_symmetric() {
        let a = Embedding(vec![1.0, 2.0, 3.0]);
        let b = Embedding(vec![-0.5, 0.25, 8.0]);
        let ab = cosine_similarity(&a, &b).expect("similarity");
        let ba = cosine_similarity(&b, &a).expect("similarity");
        assert_eq!(ab, ba);
    }

    #[test]
    fn cosine_is_magnitude_independent() {
        let a = Embedding(vec![1.0, 2.0, 3.0]);
        let scaled = Embedding(vec![2.5, 5.0, 7.5]);
        let similarity = cosine_similarity(&a, &scaled).expect("similarity");
        assert!((similarity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_of_opposite_vectors_is_minus_one() {
        let a = Embedding(vec![1.0, -2.0]);
        let b = Embedding(vec![-1.0, 2.0]);
        let similarity = cosine_similarity(&a, &b).expect("similarity");
        assert!((similarity + 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_norm_embedding_is_degenerate() {
        let zero = Embedding(vec![0.0; 4]);
        let probe = Embedding(vec![1.0, 0.0, 0.0, 0.0]);
        assert!(matches!(
            cosine_similarity(&zero, &probe),
            Err(DomainError::DegenerateEmbedding)
        ));
        assert!(matches!(
            cosine_similarity(&probe, &zero),
            Err(DomainError::DegenerateEmbedding)
        ));
    }

    #[test]
    fn cosine_rejects_dimension_mismatch() {
        let a = Embedding(vec![1.0, 2.0]);
        let b = Embedding(vec![1.0, 2.0, 3.0]);
        assert!(matches!(
            cosine_similarity(&a, &b),
            Err(DomainError::Model(_))
        ));
    }

    #[test]
    fn single_sample_profile_equals_its_embedding() {
        let e = Embedding(vec![0.5, -0.25, 1.5]);
        let profile = aggregate_profile(std::slice::from_ref(&e)).expect("profile");
        assert_eq!(profile.embedding, e);
        assert_eq!(profile.sample_count, 1);
    }

    #[test]
    fn identical_embeddings_aggregate_to_themselves() {
        let e = Embedding(vec![0.125, 0.25, -0.5, 2.0]);
        let profile = aggregate_profile(&[e.clone(), e.clone(), e.clone()]).expect("profile");
        assert_eq!(profile.embedding, e);
        assert_eq!(profile.sample_count, 3);
    }

    #[test]
    fn mean_is_componentwise() {
        let a = Embedding(vec![1.0, 0.0]);
        let b = Embedding(vec![0.0, 1.0]);
        let mean = mean_embedding(&[a, b]).expect("mean");
        assert_eq!(mean, Embedding(vec![0.5, 0.5]));
    }

    #[test]
    fn empty_enrollment_is_an_error() {
        assert!(matches!(
            aggregate_profile(&[]),
            Err(DomainError::EmptyEnrollment)
        ));
    }

    #[test]
    fn threshold_outside_range_is_rejected() {
        assert!(matches!(
            VerificationPolicy::new(1.5),
            Err(DomainError::InvalidThreshold(_))
        ));
        assert!(matches!(
            VerificationPolicy::new(f64::NAN),
            Err(DomainError::InvalidThreshold(_))
        ));
        assert!(VerificationPolicy::new(-1.0).is_ok());
        assert!(VerificationPolicy::new(1.0).is_ok());
    }

    #[test]
    fn decision_boundary_is_inclusive() {
        let profile = profile_of(Embedding(vec![1.0, 0.0]));
        let probe = Embedding(vec![1.0, 0.0]);
        let policy = VerificationPolicy::new(1.0).expect("policy");
        let result = policy.decide(&profile, &probe).expect("decision");
        assert!(result.authorized);
        assert!((result.score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn raising_threshold_above_score_flips_decision_once() {
        let profile = profile_of(Embedding(vec![1.0, 0.0]));
        let probe = Embedding(vec![1.0, 1.0]);
        let score = cosine_similarity(&profile.embedding, &probe).expect("similarity");

        let below = VerificationPolicy::new(score - 0.05).expect("policy");
        let at = VerificationPolicy::new(score).expect("policy");
        let above = VerificationPolicy::new((score + 0.05).min(1.0)).expect("policy");

        assert!(below.decide(&profile, &probe).expect("decision").authorized);
        assert!(at.decide(&profile, &probe).expect("decision").authorized);
        assert!(!above.decide(&profile, &probe).expect("decision").authorized);
    }
}
