mod common;

use common::{buy_body, TestApp, TEST_PRODUCT_ID, TEST_PRODUCT_PRICE};
use serde_json::{json, Value};
use transaction_service::models::TransactionStatus;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn buy_returns_checkout_url_and_stores_pending_transaction() {
    let app = TestApp::spawn().await;

    Mock::given(method("POST"))
        .and(path("/transaction/create"))
        .and(header("Authorization", "Bearer test-api-key"))
        .and(body_partial_json(json!({
            "method": "BRIVA",
            "amount": TEST_PRODUCT_PRICE,
            "customer_email": "budi@example.com",
            "return_url": "http://shop.test/return",
            "order_items": [{ "name": "Ebook", "price": TEST_PRODUCT_PRICE, "quantity": 1 }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "message": "",
            "data": { "reference": "T1", "merchant_ref": "INV-x", "checkout_url": "http://pay/T1" }
        })))
        .expect(1)
        .mount(&app.tripay)
        .await;

    let response = app.post_buy(&buy_body(TEST_PRODUCT_ID)).await;
    assert_eq!(response.status().as_u16(), 200);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], true);
    assert_eq!(body["message"], "success create transaction");
    assert_eq!(body["data"]["invoice_url"], "http://pay/T1");

    let transactions = app.store.transactions().await;
    assert_eq!(transactions.len(), 1);
    let stored = &transactions[0];
    assert_eq!(stored.reference, "T1");
    assert_eq!(stored.status, TransactionStatus::Pending);
    assert_eq!(stored.amount_paid, 0);
    assert!(stored.merchant_ref.starts_with("INV-"));
}

#[tokio::test]
async fn invalid_body_is_rejected_with_400() {
    let app = TestApp::spawn().await;

    let mut body = buy_body(TEST_PRODUCT_ID);
    body["email"] = json!("not-an-email");

    let response = app.post_buy(&body).await;
    assert_eq!(response.status().as_u16(), 400);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "failed to get data from body");
    assert!(body["error"].is_string());
    assert!(app.store.transactions().await.is_empty());
}

#[tokio::test]
async fn malformed_json_is_rejected_with_400() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/transaction/buy", app.address))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "failed to get data from body");
}

#[tokio::test]
async fn gateway_failure_is_reported_as_500() {
    let app = TestApp::spawn().await;
    app.mock_invoice_failure("Invalid merchant").await;

    let response = app.post_buy(&buy_body(TEST_PRODUCT_ID)).await;
    assert_eq!(response.status().as_u16(), 500);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "failed to create transaction");
    assert!(body["error"].as_str().unwrap().contains("Invalid merchant"));
    assert!(app.store.transactions().await.is_empty());
}

#[tokio::test]
async fn unknown_product_is_reported_as_500() {
    let app = TestApp::spawn().await;
    app.mock_invoice("T1", "http://pay/T1").await;

    let response = app
        .post_buy(&buy_body("00000000-0000-0000-0000-000000000000"))
        .await;
    assert_eq!(response.status().as_u16(), 500);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "failed to create transaction");
    assert!(app.store.transactions().await.is_empty());
}

#[tokio::test]
async fn store_failure_is_reported_as_500() {
    let app = TestApp::spawn().await;
    app.mock_invoice("T1", "http://pay/T1").await;
    app.store.fail_writes(true);

    let response = app.post_buy(&buy_body(TEST_PRODUCT_ID)).await;
    assert_eq!(response.status().as_u16(), 500);
}
