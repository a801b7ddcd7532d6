//! Uniform JSON response envelope.
//!
//! Every endpoint answers with the same shape so that callers only need to
//! look at `success` to tell outcomes apart:
//!
//! ```json
//! { "success": true,  "message": "...", "data": { ... } }
//! { "success": false, "message": "...", "error": "..." }
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        Self {
            success: true,
            message: message.into(),
            error: None,
            data: Some(data),
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload.
    pub fn ack(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            error: None,
            data: None,
        }
    }

    pub fn failure(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(error.into()),
            data: None,
        }
    }
}

/// A failure envelope paired with the status code it is sent with.
#[derive(Debug)]
pub struct ApiFailure {
    status: StatusCode,
    body: ApiResponse<()>,
}

impl ApiFailure {
    pub fn new(status: StatusCode, message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status,
            body: ApiResponse::failure(message, error),
        }
    }

    pub fn bad_request(message: impl Into<String>, error: impl ToString) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, error.to_string())
    }

    pub fn internal(message: impl Into<String>, error: impl ToString) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message, error.to_string())
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
