use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use speaker_application::ApplicationError;
use speaker_domain::DomainError;

#[derive(Debug)]
pub enum HttpError {
    Validation { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            HttpError::Validation { message } => (StatusCode::UNPROCESSABLE_ENTITY, message),
            HttpError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            HttpError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        (
            status,
            Json(json!({
                "error": message,
            })),
        )
            .into_response()
    }
}

pub fn error_mapper(error: ApplicationError) -> HttpError {
    match error {
        ApplicationError::Validation(_) => HttpError::Validation {
            message: error.to_string(),
        },
        ApplicationError::Domain(DomainError::ProfileNotReady) => HttpError::NotFound {
            message: error.to_string(),
        },
        ApplicationError::Domain(
            DomainError::Decode(_)
            | DomainError::EmptyEnrollment
            | DomainError::DegenerateEmbedding
            | DomainError::InvalidThreshold(_),
        ) => HttpError::Validation {
            message: error.to_string(),
        },
        _ => HttpError::Internal {
            message: error.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_not_ready_maps_to_not_found() {
        let mapped = error_mapper(ApplicationError::Domain(DomainError::ProfileNotReady));
        assert!(matches!(mapped, HttpError::NotFound { .. }));
    }

    #[test]
    fn decode_failures_map_to_validation() {
        let mapped = error_mapper(ApplicationError::Domain(DomainError::decode("bad wav")));
        assert!(matches!(mapped, HttpError::Validation { .. }));
    }

    #[test]
    fn model_failures_map_to_internal() {
        let mapped = error_mapper(ApplicationError::Domain(DomainError::model("no weights")));
        assert!(matches!(mapped, HttpError::Internal { .. }));
    }
}
