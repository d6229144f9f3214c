use axum::{extract::State, http::StatusCode, response::Json};

use speaker_application::{VerifySpeakerRequest, VerifySpeakerResponse};

use crate::error::{error_mapper, HttpError};
use crate::extract::ValidatedJson;
use crate::state::AppState;

pub async fn verify_speaker(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<VerifySpeakerRequest>,
) -> Result<(StatusCode, Json<VerifySpeakerResponse>), HttpError> {
    tracing::info!(
        sample_count = request.samples.as_ref().map(Vec::len).unwrap_or(0),
        source_path = request.source_path.as_deref().unwrap_or("-"),
        session_id = request.session_id.as_deref().unwrap_or("auto"),
        "received verify request"
    );

    match state.verify_usecase.verify(request).await {
        Ok(response) => {
            tracing::info!(
                authorized = response.authorized,
                score = response.score,
                "verify request completed"
            );
            Ok((StatusCode::OK, Json(response)))
        }
        Err(error) => {
            tracing::error!(error = %error, "verify request failed");
            Err(error_mapper(error))
        }
    }
}
