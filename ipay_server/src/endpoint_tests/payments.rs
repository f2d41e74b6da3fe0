use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use ipay_common::Amount;
use ipay_engine::{
    db_types::{Transaction, TransactionStatus},
    PaymentFlowApi,
};
use serde_json::Value;

use super::{
    helpers::{api_scope, customer_token, employee_token, send, with_bearer},
    mocks::MockTransactionManager,
};
use crate::{routes::SubmitPaymentRoute, server::json_config};

fn configure(db: MockTransactionManager) -> impl FnOnce(&mut ServiceConfig) {
    api_scope(move |cfg| {
        cfg.app_data(web::Data::new(PaymentFlowApi::new(db)))
            .app_data(json_config())
            .service(SubmitPaymentRoute::<MockTransactionManager>::new());
    })
}

fn submit(token: &str, body: &str) -> TestRequest {
    let req = TestRequest::post()
        .uri("/api/payments")
        .insert_header(("Content-Type", "application/json"))
        .set_payload(body.to_string());
    with_bearer(req, token)
}

fn echo_insert(db: &mut MockTransactionManager) {
    db.expect_insert_transaction().times(1).returning(|tx| {
        Ok(Transaction {
            id: 1,
            customer_id: tx.customer_id,
            amount: tx.amount,
            currency: tx.currency,
            provider: tx.provider,
            payee_account: tx.payee_account,
            swift_code: tx.swift_code,
            status: TransactionStatus::Pending,
            processed_by_employee_id: None,
            created_at: chrono::Utc::now(),
        })
    });
}

#[actix_web::test]
async fn customer_submits_payment() {
    let _ = env_logger::try_init().ok();
    let mut db = MockTransactionManager::new();
    echo_insert(&mut db);
    let body = r#"{"amount":"100.00","currency":"USD","provider":"SWIFT","payeeAccount":"1234567","swiftCode":"ABCDUS33"}"#;
    let (status, body) = send(submit(&customer_token(), body), configure(db)).await;
    assert_eq!(status, StatusCode::CREATED);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["message"], "Payment submitted successfully.");
    let tx = &json["transaction"];
    assert_eq!(tx["status"], "Pending");
    assert_eq!(tx["amount"], "100.00");
    assert_eq!(tx["customerId"], 1);
    assert_eq!(tx["swiftCode"], "ABCDUS33");
    assert!(tx["processedByEmployeeId"].is_null());
}

#[actix_web::test]
async fn numeric_amounts_are_accepted() {
    let _ = env_logger::try_init().ok();
    let mut db = MockTransactionManager::new();
    db.expect_insert_transaction().withf(|tx| tx.amount == Amount::from_cents(10_050)).times(1).returning(|tx| {
        Ok(Transaction {
            id: 2,
            customer_id: tx.customer_id,
            amount: tx.amount,
            currency: tx.currency.clone(),
            provider: tx.provider.clone(),
            payee_account: tx.payee_account.clone(),
            swift_code: tx.swift_code.clone(),
            status: TransactionStatus::Pending,
            processed_by_employee_id: None,
            created_at: chrono::Utc::now(),
        })
    });
    let body = r#"{"amount":100.5,"currency":"EUR","provider":"SWIFT","payeeAccount":"123456789012","swiftCode":"DEUTDEFF500"}"#;
    let (status, body) = send(submit(&customer_token(), body), configure(db)).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["transaction"]["amount"], "100.50");
}

#[actix_web::test]
async fn invalid_payment_fields_are_rejected() {
    let _ = env_logger::try_init().ok();
    let cases = [
        r#"{"amount":"0","currency":"USD","provider":"SWIFT","payeeAccount":"1234567","swiftCode":"ABCDUS33"}"#,
        r#"{"amount":"10.999","currency":"USD","provider":"SWIFT","payeeAccount":"1234567","swiftCode":"ABCDUS33"}"#,
        r#"{"amount":"-5","currency":"USD","provider":"SWIFT","payeeAccount":"1234567","swiftCode":"ABCDUS33"}"#,
        r#"{"amount":"100.00","currency":"usd","provider":"SWIFT","payeeAccount":"1234567","swiftCode":"ABCDUS33"}"#,
        r#"{"amount":"100.00","currency":"USD","provider":"  ","payeeAccount":"1234567","swiftCode":"ABCDUS33"}"#,
        r#"{"amount":"100.00","currency":"USD","provider":"SWIFT","payeeAccount":"123","swiftCode":"ABCDUS33"}"#,
        r#"{"amount":"100.00","currency":"USD","provider":"SWIFT","payeeAccount":"1234567","swiftCode":"ABCDUS3"}"#,
        r#"{"amount":"100.00","currency":"USD","provider":"SWIFT","payeeAccount":"1234567"}"#,
    ];
    for payload in cases {
        let mut db = MockTransactionManager::new();
        db.expect_insert_transaction().never();
        let (status, body) = send(submit(&customer_token(), payload), configure(db)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload} -> {body}");
    }
}

#[actix_web::test]
async fn employees_cannot_submit_payments() {
    let _ = env_logger::try_init().ok();
    let mut db = MockTransactionManager::new();
    db.expect_insert_transaction().never();
    let body = r#"{"amount":"100.00","currency":"USD","provider":"SWIFT","payeeAccount":"1234567","swiftCode":"ABCDUS33"}"#;
    let (status, body) = send(submit(&employee_token(), body), configure(db)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, r#"{"error":"You do not have permission to access this resource."}"#);
}

#[actix_web::test]
async fn payments_need_a_token() {
    let _ = env_logger::try_init().ok();
    let mut db = MockTransactionManager::new();
    db.expect_insert_transaction().never();
    let req = TestRequest::post().uri("/api/payments").insert_header(("Content-Type", "application/json"));
    let (status, _) = send(req.set_payload("{}"), configure(db)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}
