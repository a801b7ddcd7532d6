use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub const MESSAGE_SUCCESS_CREATE_TRANSACTION: &str = "success create transaction";
pub const MESSAGE_SUCCESS_GET_CALLBACK_TRIPAY: &str = "success get callback tripay";

pub const MESSAGE_FAILED_GET_DATA_FROM_BODY: &str = "failed to get data from body";
pub const MESSAGE_FAILED_CREATE_TRANSACTION: &str = "failed to create transaction";
pub const MESSAGE_FAILED_GET_CALLBACK_TRIPAY: &str = "failed get callback tripay";

/// The only callback event this service acts on.
pub const CALLBACK_EVENT_PAYMENT_STATUS: &str = "payment_status";

pub const CALLBACK_SIGNATURE_HEADER: &str = "X-Callback-Signature";
pub const CALLBACK_EVENT_HEADER: &str = "X-Callback-Event";

fn validate_uuid(value: &str) -> Result<(), ValidationError> {
    Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("uuid"))
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTransactionRequest {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "mobile_number is required"))]
    pub mobile_number: String,

    #[validate(custom(function = "validate_uuid", message = "product_id must be a UUID"))]
    pub product_id: String,

    #[validate(length(min = 1, message = "payment_method is required"))]
    pub payment_method: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateTransactionResponse {
    pub invoice_url: String,
}

/// Tripay callback body. Only `reference`, `status`, `total_amount` and
/// `is_closed_payment` drive state; the rest is kept for logging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TripayWebhookRequest {
    pub reference: String,
    pub merchant_ref: String,
    pub payment_method: String,
    pub payment_method_code: String,
    pub total_amount: i64,
    pub fee_merchant: i64,
    pub fee_customer: i64,
    pub total_fee: i64,
    pub amount_received: i64,
    pub is_closed_payment: i64,
    pub status: String,
    pub paid_at: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TripayWebhookResponse {
    pub success: bool,
}
