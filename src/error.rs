use axum::http::StatusCode;
use axum::response::{ IntoResponse, Response };
use axum::Json;
use thiserror::Error;

use crate::llm::chat::LlmError;
use crate::models::ErrorBody;
use crate::response::ParseError;
use crate::store::StoreError;

/// Failure of a chat request. Every variant aborts the request with no
/// partial response.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("no profile for user '{0}'")]
    ProfileNotFound(String),

    #[error("store unavailable: {0}")]
    StoreUnavailable(#[from] StoreError),

    #[error("generation unavailable: {0}")]
    GenerationUnavailable(#[from] LlmError),

    #[error("invalid generation output: {0}")]
    InvalidGenerationOutput(#[from] ParseError),
}

impl ChatError {
    /// Stable classification string returned to callers.
    pub fn kind(&self) -> &'static str {
        match self {
            ChatError::InvalidInput(_) => "InvalidInput",
            ChatError::ProfileNotFound(_) => "ProfileNotFound",
            ChatError::StoreUnavailable(_) => "StoreUnavailable",
            ChatError::GenerationUnavailable(_) => "GenerationUnavailable",
            ChatError::InvalidGenerationOutput(_) => "InvalidGenerationOutput",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ChatError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ChatError::ProfileNotFound(_) => StatusCode::NOT_FOUND,
            ChatError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ChatError::GenerationUnavailable(_) => StatusCode::BAD_GATEWAY,
            ChatError::InvalidGenerationOutput(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Caller-facing body. Driver errors and generated text stay out of it.
    pub fn to_body(&self) -> ErrorBody {
        let details = match self {
            ChatError::InvalidInput(reason) => Some(reason.clone()),
            ChatError::InvalidGenerationOutput(err) => Some(err.summary().to_string()),
            _ => None,
        };
        ErrorBody::new(self.kind(), details)
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.to_body())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn taxonomy_maps_to_status_codes() {
        assert_eq!(ChatError::InvalidInput("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(ChatError::ProfileNotFound("9".into()).status_code(), StatusCode::NOT_FOUND);
        assert!(
            ChatError::StoreUnavailable(StoreError::Unavailable("down".into()))
                .status_code()
                .is_server_error()
        );
        assert!(
            ChatError::GenerationUnavailable(LlmError::Timeout(Duration::from_secs(1)))
                .status_code()
                .is_server_error()
        );
    }

    #[test]
    fn invalid_output_body_never_contains_raw_text() {
        let err = ChatError::from(ParseError::Syntax {
            reason: "expected value at line 1 column 1".into(),
            raw: "SECRET PROSE FROM THE MODEL".into(),
        });
        let body = err.to_body();
        assert_eq!(body.error, "InvalidGenerationOutput");
        assert_eq!(body.details.as_deref(), Some("generated text is not valid JSON"));
        assert!(!serde_json::to_string(&body).unwrap().contains("SECRET PROSE"));
    }

    #[test]
    fn store_failure_body_hides_driver_message() {
        let err = ChatError::from(StoreError::Unavailable("Access denied for user 'root'".into()));
        let body = err.to_body();
        assert_eq!(body.error, "StoreUnavailable");
        assert!(body.details.is_none());
    }
}
