//! Checkout and Tripay callback handlers.
//!
//! Both endpoints answer with the shared envelope. Checkout failures are
//! reported as 500 once the body is valid; every callback failure is a 400
//! so Tripay records the delivery as rejected.

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Json,
};
use service_core::error::AppError;
use service_core::response::{ApiFailure, ApiResponse};
use service_core::utils::ValidatedJson;

use crate::{
    dtos::{
        CreateTransactionRequest, TripayWebhookRequest, CALLBACK_EVENT_HEADER,
        CALLBACK_SIGNATURE_HEADER, MESSAGE_FAILED_CREATE_TRANSACTION,
        MESSAGE_FAILED_GET_CALLBACK_TRIPAY, MESSAGE_FAILED_GET_DATA_FROM_BODY,
        MESSAGE_SUCCESS_CREATE_TRANSACTION, MESSAGE_SUCCESS_GET_CALLBACK_TRIPAY,
    },
    services::TripayCallback,
    AppState,
};

/// Open a Tripay invoice for a product and return its checkout URL.
pub async fn buy(
    State(state): State<AppState>,
    payload: Result<ValidatedJson<CreateTransactionRequest>, AppError>,
) -> Result<Response, ApiFailure> {
    let ValidatedJson(request) = payload.map_err(|e| {
        tracing::debug!(error = %e, "Rejected checkout body");
        ApiFailure::bad_request(MESSAGE_FAILED_GET_DATA_FROM_BODY, e)
    })?;

    let response = state
        .service
        .create_transaction(request)
        .await
        .map_err(|e| ApiFailure::internal(MESSAGE_FAILED_CREATE_TRANSACTION, e))?;

    Ok(Json(ApiResponse::success(MESSAGE_SUCCESS_CREATE_TRANSACTION, response)).into_response())
}

/// Receive a Tripay payment-status callback.
///
/// The body is taken as raw bytes because the signature covers exactly what
/// Tripay sent.
pub async fn tripay_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiFailure> {
    let payload: TripayWebhookRequest = serde_json::from_slice(&body)
        .map_err(|e| ApiFailure::bad_request(MESSAGE_FAILED_GET_DATA_FROM_BODY, e))?;

    let signature = header_str(&headers, CALLBACK_SIGNATURE_HEADER);
    let event = header_str(&headers, CALLBACK_EVENT_HEADER);

    tracing::info!(
        reference = %payload.reference,
        merchant_ref = %payload.merchant_ref,
        status = %payload.status,
        event = %event,
        "Received Tripay callback"
    );

    state
        .service
        .handle_tripay_webhook(TripayCallback {
            raw_body: &body,
            payload: &payload,
            signature,
            event,
        })
        .await
        .map_err(|e| ApiFailure::bad_request(MESSAGE_FAILED_GET_CALLBACK_TRIPAY, e))?;

    Ok(Json(ApiResponse::ack(MESSAGE_SUCCESS_GET_CALLBACK_TRIPAY)).into_response())
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}
