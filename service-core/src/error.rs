use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::response::ApiFailure;

/// Rejection produced by the request extractors in [`crate::utils`].
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),
}

impl AppError {
    fn message(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "Validation error",
            AppError::BadRequest(_) => "Bad request",
        }
    }
}

/// Both variants are client errors and render as a 400 envelope.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let details = match &self {
            AppError::ValidationError(err) => err.to_string(),
            AppError::BadRequest(err) => err.to_string(),
        };

        ApiFailure::bad_request(self.message(), details).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use validator::ValidationErrors;

    #[test]
    fn display_includes_cause() {
        let err = AppError::BadRequest(anyhow::anyhow!("missing field"));
        assert_eq!(err.to_string(), "Bad request: missing field");
    }

    #[test]
    fn rejections_render_as_400() {
        let bad = AppError::BadRequest(anyhow::anyhow!("missing field")).into_response();
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let invalid = AppError::from(ValidationErrors::new()).into_response();
        assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);
    }
}
