//! Tripay payment gateway client.
//!
//! Implements the closed-payment `transaction/create` call used to open an
//! invoice. Callback verification lives in [`super::signature`].

use crate::config::TripayConfig;
use crate::services::signature::TripaySignature;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The merchant reference is the correlation key for the callback and
    /// part of the signed string; it must be set before signing.
    #[error("signature not configured: merchant reference is empty")]
    SignatureNotConfigured,

    #[error("failed to sign invoice request: {0}")]
    Signing(anyhow::Error),

    #[error("request to Tripay failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Tripay rejected the request: {0}")]
    Api(String),

    #[error("failed to decode Tripay response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Line item on a Tripay invoice.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct OrderItem {
    pub sku: String,
    pub name: String,
    /// Unit price in minor units.
    pub price: i64,
    pub quantity: i64,
    pub product_url: String,
    pub image_url: String,
}

/// Unsigned invoice; the client adds the signature on send.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InvoiceRequest {
    /// Payment channel code, e.g. `BRIVA`.
    pub method: String,
    pub merchant_ref: String,
    pub amount: i64,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    pub order_items: Vec<OrderItem>,
    pub return_url: String,
    /// Unix timestamp (seconds) after which the invoice expires.
    pub expired_time: i64,
}

#[derive(Serialize)]
struct SignedInvoiceRequest<'a> {
    #[serde(flatten)]
    invoice: &'a InvoiceRequest,
    signature: String,
}

#[derive(Debug, Deserialize)]
struct TripayResponse {
    success: bool,
    #[serde(default)]
    message: String,
    data: Option<TripayInvoiceData>,
}

#[derive(Debug, Deserialize)]
struct TripayInvoiceData {
    reference: String,
    #[serde(default)]
    merchant_ref: String,
    checkout_url: String,
}

/// Normalized result of a successful invoice creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceResult {
    pub reference: String,
    pub merchant_ref: String,
    pub checkout_url: String,
}

/// Opens invoices with a payment gateway.
#[async_trait]
pub trait InvoiceGateway: Send + Sync {
    async fn create_invoice(&self, invoice: &InvoiceRequest) -> Result<InvoiceResult, GatewayError>;
}

/// Tripay client for interacting with the Tripay API.
#[derive(Clone)]
pub struct TripayClient {
    client: Client,
    config: TripayConfig,
}

impl TripayClient {
    pub fn new(config: TripayConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;

        Ok(Self { client, config })
    }

    /// Check if Tripay is configured (credentials are set).
    pub fn is_configured(&self) -> bool {
        !self.config.merchant_code.is_empty()
            && !self.config.api_key.expose_secret().is_empty()
            && !self.config.private_key.expose_secret().is_empty()
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    fn sign(&self, invoice: &InvoiceRequest) -> Result<String, GatewayError> {
        if invoice.merchant_ref.is_empty() {
            return Err(GatewayError::SignatureNotConfigured);
        }

        TripaySignature {
            merchant_code: self.config.merchant_code.clone(),
            merchant_ref: invoice.merchant_ref.clone(),
            amount: invoice.amount,
            channel: invoice.method.clone(),
        }
        .sign(self.config.private_key.expose_secret())
        .map_err(GatewayError::Signing)
    }
}

#[async_trait]
impl InvoiceGateway for TripayClient {
    async fn create_invoice(&self, invoice: &InvoiceRequest) -> Result<InvoiceResult, GatewayError> {
        let signature = self.sign(invoice)?;
        let body = SignedInvoiceRequest { invoice, signature };

        let url = format!("{}/transaction/create", self.base_url());

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.config.api_key.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;

        tracing::debug!(status = %status, body = %text, "Tripay transaction/create response");

        let parsed: TripayResponse = match serde_json::from_str(&text) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(GatewayError::Api(format!("HTTP {}: {}", status, text)));
            }
            Err(e) => return Err(GatewayError::Decode(e)),
        };

        if !parsed.success {
            tracing::error!(
                status = %status,
                message = %parsed.message,
                merchant_ref = %invoice.merchant_ref,
                "Tripay invoice creation failed"
            );
            return Err(GatewayError::Api(parsed.message));
        }

        let data = parsed
            .data
            .ok_or_else(|| GatewayError::Api("response did not include invoice data".to_string()))?;

        tracing::info!(
            reference = %data.reference,
            merchant_ref = %invoice.merchant_ref,
            amount = invoice.amount,
            "Tripay invoice created"
        );

        Ok(InvoiceResult {
            reference: data.reference,
            merchant_ref: data.merchant_ref,
            checkout_url: data.checkout_url,
        })
    }
}
