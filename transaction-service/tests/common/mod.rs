#![allow(dead_code)]

use secrecy::Secret;
use serde_json::{json, Value};
use service_core::utils::sign_hmac_sha256;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use transaction_service::config::{TripayConfig, TripayMode};
use transaction_service::models::Product;
use transaction_service::services::{InMemoryTransactionStore, TransactionService, TripayClient};
use transaction_service::{router, AppState};
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const TEST_PRIVATE_KEY: &str = "test-private-key";
pub const TEST_PRODUCT_ID: &str = "6f1c8a4e-8a53-4f55-9a3c-3c1f2a9d7b10";
pub const TEST_PRODUCT_PRICE: i64 = 50000;

pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryTransactionStore>,
    pub tripay: MockServer,
    pub client: reqwest::Client,
}

impl TestApp {
    /// Serve the real router on a random port, backed by the in-memory store
    /// and a mock Tripay API.
    pub async fn spawn() -> Self {
        let tripay = MockServer::start().await;

        let store = Arc::new(InMemoryTransactionStore::with_products([Product {
            id: Uuid::parse_str(TEST_PRODUCT_ID).unwrap(),
            name: "Ebook".to_string(),
            price: TEST_PRODUCT_PRICE,
        }]));

        let tripay_config = TripayConfig {
            merchant_code: "T0001".to_string(),
            api_key: Secret::new("test-api-key".to_string()),
            private_key: Secret::new(TEST_PRIVATE_KEY.to_string()),
            mode: TripayMode::Development,
            base_url: Some(tripay.uri()),
            request_timeout_secs: 5,
        };
        let gateway = TripayClient::new(tripay_config).expect("Failed to build Tripay client");

        let service = TransactionService::new(
            store.clone(),
            Arc::new(gateway),
            Secret::new(TEST_PRIVATE_KEY.to_string()),
            "http://shop.test/return".to_string(),
            Duration::from_secs(10),
        );

        let app = router(AppState {
            service: Arc::new(service),
        });

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            address: format!("http://127.0.0.1:{}", port),
            store,
            tripay,
            client: reqwest::Client::new(),
        }
    }

    /// Answer `transaction/create` with a successful invoice.
    pub async fn mock_invoice(&self, reference: &str, checkout_url: &str) {
        Mock::given(method("POST"))
            .and(path("/transaction/create"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "message": "",
                "data": {
                    "reference": reference,
                    "merchant_ref": "INV-test",
                    "checkout_url": checkout_url
                }
            })))
            .mount(&self.tripay)
            .await;
    }

    pub async fn mock_invoice_failure(&self, message: &str) {
        Mock::given(method("POST"))
            .and(path("/transaction/create"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "success": false,
                "message": message
            })))
            .mount(&self.tripay)
            .await;
    }

    pub async fn post_buy(&self, body: &Value) -> reqwest::Response {
        self.client
            .post(format!("{}/transaction/buy", self.address))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn post_webhook(&self, body: &[u8], signature: &str, event: &str) -> reqwest::Response {
        self.client
            .post(format!("{}/transaction/webhook/tripay", self.address))
            .header("Content-Type", "application/json")
            .header("X-Callback-Signature", signature)
            .header("X-Callback-Event", event)
            .body(body.to_vec())
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Create a pending transaction with the given Tripay reference.
    pub async fn checkout(&self, reference: &str) {
        self.mock_invoice(reference, &format!("http://pay.test/{}", reference))
            .await;
        let response = self.post_buy(&buy_body(TEST_PRODUCT_ID)).await;
        assert!(response.status().is_success());
    }
}

pub fn buy_body(product_id: &str) -> Value {
    json!({
        "name": "Budi",
        "email": "budi@example.com",
        "mobile_number": "081234567890",
        "product_id": product_id,
        "payment_method": "BRIVA"
    })
}

pub fn callback_body(reference: &str, status: &str, total_amount: i64, is_closed_payment: i64) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "reference": reference,
        "merchant_ref": "INV-test",
        "payment_method": "BRI Virtual Account",
        "payment_method_code": "BRIVA",
        "total_amount": total_amount,
        "fee_merchant": 0,
        "fee_customer": 0,
        "total_fee": 0,
        "amount_received": total_amount,
        "is_closed_payment": is_closed_payment,
        "status": status,
        "paid_at": 1_700_000_000
    }))
    .unwrap()
}

pub fn sign(body: &[u8]) -> String {
    sign_hmac_sha256(TEST_PRIVATE_KEY.as_bytes(), body).unwrap()
}
