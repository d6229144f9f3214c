use axum::{extract::State, http::StatusCode, response::Json};

use speaker_application::{EnrollSpeakerRequest, EnrollSpeakerResponse};

use crate::error::{error_mapper, HttpError};
use crate::extract::ValidatedJson;
use crate::state::AppState;

pub async fn enroll_speaker(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<EnrollSpeakerRequest>,
) -> Result<(StatusCode, Json<EnrollSpeakerResponse>), HttpError> {
    tracing::info!(
        source_count = request.sources.as_ref().map(Vec::len).unwrap_or(0),
        session_id = request.session_id.as_deref().unwrap_or("auto"),
        "received enroll request"
    );

    match state.enroll_usecase.enroll(request).await {
        Ok(response) => {
            tracing::info!(
                sample_count = response.sample_count,
                skipped = response.skipped,
                "enroll request completed"
            );
            Ok((StatusCode::OK, Json(response)))
        }
        Err(error) => {
            tracing::error!(error = %error, "enroll request failed");
            Err(error_mapper(error))
        }
    }
}
