use axum::{extract::State, http::StatusCode, response::Json};
use serde::Serialize;

use crate::error::HttpError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileStatusResponse {
    pub enrolled: bool,
    pub sample_count: usize,
    pub embedding_dim: usize,
}

/// Diagnostics only: the raw profile embedding is never exposed.
pub async fn profile_status(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ProfileStatusResponse>), HttpError> {
    let snapshot = state
        .profile_store
        .snapshot()
        .map_err(|error| HttpError::Internal {
            message: error.to_string(),
        })?;

    let response = match snapshot {
        Some(profile) => ProfileStatusResponse {
            enrolled: true,
            sample_count: profile.sample_count,
            embedding_dim: profile.embedding_dim(),
        },
        None => ProfileStatusResponse {
            enrolled: false,
            sample_count: 0,
            embedding_dim: 0,
        },
    };
    Ok((StatusCode::OK, Json(response)))
}
