//! Invoice creation and Tripay callback reconciliation.

use crate::dtos::{
    CreateTransactionRequest, CreateTransactionResponse, TripayWebhookRequest,
    TripayWebhookResponse, CALLBACK_EVENT_PAYMENT_STATUS,
};
use crate::models::{Transaction, TransactionStatus};
use crate::services::metrics;
use crate::services::repository::TransactionStore;
use crate::services::signature::verify_callback_signature;
use crate::services::tripay::{GatewayError, InvoiceGateway, InvoiceRequest, OrderItem};
use chrono::{Duration as ChronoDuration, Utc};
use mongodb::bson::DateTime;
use secrecy::{ExposeSecret, Secret};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Invoices stay payable for a fixed window.
const INVOICE_EXPIRY_HOURS: i64 = 24;

/// Broad class of a [`TransactionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authentication,
    BusinessRule,
    NotFound,
    Upstream,
    Persistence,
    Timeout,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Authentication => "authentication",
            ErrorKind::BusinessRule => "business_rule",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Upstream => "upstream",
            ErrorKind::Persistence => "persistence",
            ErrorKind::Timeout => "timeout",
        }
    }
}

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("unrecognized callback event")]
    UnrecognizedCallbackEvent,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("only closed payment supported")]
    OnlyClosedPaymentSupported,

    #[error("transaction not found")]
    TransactionNotFound,

    #[error("unknown status")]
    UnknownStatus(String),

    #[error("failed to update transaction status")]
    UpdateFailed(#[source] anyhow::Error),

    #[error("product lookup failed: {0}")]
    ProductLookup(String),

    #[error("failed to create invoice: {0}")]
    InvoiceCreationFailed(#[from] GatewayError),

    #[error("failed to save transaction")]
    PersistFailed(#[source] anyhow::Error),

    #[error("operation timed out")]
    Timeout,
}

impl TransactionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransactionError::UnrecognizedCallbackEvent => ErrorKind::Validation,
            TransactionError::InvalidSignature => ErrorKind::Authentication,
            TransactionError::OnlyClosedPaymentSupported | TransactionError::UnknownStatus(_) => {
                ErrorKind::BusinessRule
            }
            TransactionError::TransactionNotFound | TransactionError::ProductLookup(_) => {
                ErrorKind::NotFound
            }
            TransactionError::InvoiceCreationFailed(_) => ErrorKind::Upstream,
            TransactionError::UpdateFailed(_) | TransactionError::PersistFailed(_) => {
                ErrorKind::Persistence
            }
            TransactionError::Timeout => ErrorKind::Timeout,
        }
    }
}

/// Raw callback as received over HTTP.
#[derive(Debug, Clone)]
pub struct TripayCallback<'a> {
    /// Body bytes exactly as delivered; the signature covers these.
    pub raw_body: &'a [u8],
    pub payload: &'a TripayWebhookRequest,
    pub signature: &'a str,
    pub event: &'a str,
}

pub struct TransactionService {
    store: Arc<dyn TransactionStore>,
    gateway: Arc<dyn InvoiceGateway>,
    private_key: Secret<String>,
    return_url: String,
    webhook_timeout: Duration,
}

impl TransactionService {
    pub fn new(
        store: Arc<dyn TransactionStore>,
        gateway: Arc<dyn InvoiceGateway>,
        private_key: Secret<String>,
        return_url: String,
        webhook_timeout: Duration,
    ) -> Self {
        Self {
            store,
            gateway,
            private_key,
            return_url,
            webhook_timeout,
        }
    }

    /// Open a Tripay invoice for one unit of a product and record it as a
    /// pending transaction.
    pub async fn create_transaction(
        &self,
        req: CreateTransactionRequest,
    ) -> Result<CreateTransactionResponse, TransactionError> {
        let product_id = Uuid::parse_str(&req.product_id).map_err(|_| {
            TransactionError::ProductLookup(format!("invalid product id '{}'", req.product_id))
        })?;

        let product = self
            .store
            .get_product_by_id(product_id)
            .await
            .map_err(|e| {
                tracing::error!(product_id = %product_id, error = %e, "Product lookup failed");
                TransactionError::ProductLookup(e.to_string())
            })?
            .ok_or_else(|| {
                TransactionError::ProductLookup(format!("product {} not found", product_id))
            })?;

        let transaction_id = Uuid::new_v4();
        let merchant_ref = format!("INV-{}", transaction_id);
        let expired_time = (Utc::now() + ChronoDuration::hours(INVOICE_EXPIRY_HOURS)).timestamp();

        let invoice = InvoiceRequest {
            method: req.payment_method,
            merchant_ref: merchant_ref.clone(),
            amount: product.price,
            customer_name: req.name,
            customer_email: req.email,
            customer_phone: req.mobile_number,
            order_items: vec![OrderItem {
                sku: product.name.clone(),
                name: product.name.clone(),
                price: product.price,
                quantity: 1,
                product_url: String::new(),
                image_url: String::new(),
            }],
            return_url: self.return_url.clone(),
            expired_time,
        };

        tracing::info!(
            transaction_id = %transaction_id,
            product_id = %product.id,
            amount = product.price,
            method = %invoice.method,
            "Creating Tripay invoice"
        );

        let result = self.gateway.create_invoice(&invoice).await.map_err(|e| {
            tracing::error!(merchant_ref = %merchant_ref, error = %e, "Tripay invoice creation failed");
            TransactionError::InvoiceCreationFailed(e)
        })?;

        let now = DateTime::now();
        let transaction = Transaction {
            id: transaction_id,
            product_id: product.id,
            merchant_ref,
            amount_paid: 0,
            status: TransactionStatus::Pending,
            invoice_url: result.checkout_url,
            reference: result.reference,
            created_at: now,
            updated_at: now,
        };

        let transaction = self
            .store
            .create_transaction(transaction)
            .await
            .map_err(|e| {
                tracing::error!(transaction_id = %transaction_id, error = %e, "Failed to save transaction");
                TransactionError::PersistFailed(e)
            })?;

        metrics::record_transaction_created();
        tracing::info!(
            transaction_id = %transaction.id,
            reference = %transaction.reference,
            "Transaction created"
        );

        Ok(CreateTransactionResponse {
            invoice_url: transaction.invoice_url,
        })
    }

    /// Verify a Tripay callback and apply it, bounded by the webhook deadline.
    pub async fn handle_tripay_webhook(
        &self,
        callback: TripayCallback<'_>,
    ) -> Result<TripayWebhookResponse, TransactionError> {
        let reference = callback.payload.reference.clone();

        let outcome = match tokio::time::timeout(self.webhook_timeout, self.apply_webhook(callback)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::error!(
                    reference = %reference,
                    timeout_secs = self.webhook_timeout.as_secs(),
                    "Tripay callback processing timed out"
                );
                Err(TransactionError::Timeout)
            }
        };

        match &outcome {
            Ok(_) => metrics::record_webhook("applied"),
            Err(e) => {
                tracing::warn!(reference = %reference, error = %e, "Tripay callback rejected");
                metrics::record_webhook(e.kind().as_str());
            }
        }

        outcome
    }

    /// Gates run in order and stop at the first failure. The store write is
    /// the final step, so a rejected callback never mutates anything.
    async fn apply_webhook(
        &self,
        callback: TripayCallback<'_>,
    ) -> Result<TripayWebhookResponse, TransactionError> {
        if callback.event != CALLBACK_EVENT_PAYMENT_STATUS {
            return Err(TransactionError::UnrecognizedCallbackEvent);
        }

        let valid = verify_callback_signature(
            self.private_key.expose_secret(),
            callback.raw_body,
            callback.signature,
        )
        .map_err(|_| TransactionError::InvalidSignature)?;
        if !valid {
            return Err(TransactionError::InvalidSignature);
        }

        let payload = callback.payload;

        if payload.is_closed_payment != 1 {
            return Err(TransactionError::OnlyClosedPaymentSupported);
        }

        let mut transaction = self
            .store
            .get_transaction_by_reference(&payload.reference)
            .await
            .map_err(|e| {
                tracing::error!(reference = %payload.reference, error = %e, "Transaction lookup failed");
                TransactionError::TransactionNotFound
            })?
            .ok_or(TransactionError::TransactionNotFound)?;

        let status = TransactionStatus::from_callback(&payload.status)
            .ok_or_else(|| TransactionError::UnknownStatus(payload.status.clone()))?;

        if transaction.status.is_terminal() {
            tracing::warn!(
                reference = %transaction.reference,
                from = %transaction.status,
                to = %status,
                "Overwriting settled transaction status"
            );
        }

        // Tripay reports the invoice total for every status, not only PAID.
        transaction.status = status;
        transaction.amount_paid = payload.total_amount;
        transaction.updated_at = DateTime::now();

        self.store
            .update_transaction(&transaction)
            .await
            .map_err(TransactionError::UpdateFailed)?;

        tracing::info!(
            reference = %transaction.reference,
            status = %transaction.status,
            amount_paid = transaction.amount_paid,
            "Transaction updated from Tripay callback"
        );

        Ok(TripayWebhookResponse { success: true })
    }
}
