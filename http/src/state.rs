use std::sync::Arc;

use speaker_application::{EnrollSpeakerUseCase, ProfileStore, VerifySpeakerUseCase};

#[derive(Clone)]
pub struct AppState {
    pub enroll_usecase: Arc<dyn EnrollSpeakerUseCase>,
    pub verify_usecase: Arc<dyn VerifySpeakerUseCase>,
    pub profile_store: Arc<ProfileStore>,
}

impl AppState {
    pub fn new(
        enroll_usecase: Arc<dyn EnrollSpeakerUseCase>,
        verify_usecase: Arc<dyn VerifySpeakerUseCase>,
        profile_store: Arc<ProfileStore>,
    ) -> Self {
        Self {
            enroll_usecase,
            verify_usecase,
            profile_store,
        }
    }
}
