use std::sync::{Arc, RwLock};

use speaker_domain::{DomainError, EnrollmentProfile};

/// Shared, read-mostly holder for the active enrollment profile.
///
/// Verification reads the profile concurrently; re-enrollment replaces it
/// with a single atomic swap, so readers observe either the old or the new
/// profile, never a partial update.
#[derive(Default)]
pub struct ProfileStore {
    inner: RwLock<Option<Arc<EnrollmentProfile>>>,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The active profile, or `ProfileNotReady` if enrollment has not
    /// succeeded yet. Never silently downgrades to "unauthorized".
    pub fn current(&self) -> Result<Arc<EnrollmentProfile>, DomainError> {
        self.inner
            .read()
            .map_err(|_| DomainError::internal("profile store lock poisoned"))?
            .clone()
            .ok_or(DomainError::ProfileNotReady)
    }

    pub fn snapshot(&self) -> Result<Option<Arc<EnrollmentProfile>>, DomainError> {
        Ok(self
            .inner
            .read()
            .map_err(|_| DomainError::internal("profile store lock poisoned"))?
            .clone())
    }

    pub fn replace(&self, profile: EnrollmentProfile) -> Result<(), DomainError> {
        let mut guard = self
            .inner
            .write()
            .map_err(|_| DomainError::internal("profile store lock poisoned"))?;
        *guard = Some(Arc::new(profile));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use speaker_domain::Embedding;

    #[test]
    fn empty_store_reports_profile_not_ready() {
        let store = ProfileStore::new();
        assert!(matches!(store.current(), Err(DomainError::ProfileNotReady)));
        assert!(store.snapshot().expect("snapshot").is_none());
    }

    #[test]
    fn replace_swaps_the_whole_profile() {
        let store = ProfileStore::new();
        store
            .replace(EnrollmentProfile {
                embedding: Embedding(vec![1.0, 0.0]),
                sample_count: 2,
            })
            .expect("replace");
        let first = store.current().expect("profile");
        assert_eq!(first.sample_count, 2);

        store
            .replace(EnrollmentProfile {
                embedding: Embedding(vec![0.0, 1.0]),
                sample_count: 5,
            })
            .expect("replace");
        let second = store.current().expect("profile");
        assert_eq!(second.sample_count, 5);
        // The old snapshot stays intact for readers that still hold it.
        assert_eq!(first.sample_count, 2);
    }
}
