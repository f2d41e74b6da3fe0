use actix_web::{http::StatusCode, test::TestRequest, web, web::ServiceConfig};
use chrono::Utc;
use ipay_engine::{
    db_types::{StatusChange, TransactionDetail, TransactionStatus},
    traits::{BatchSettlement, TransitionResult},
    PaymentFlowApi,
    MAX_BATCH_SIZE,
};
use serde_json::{json, Value};

use super::{
    helpers::{api_scope, customer_token, employee_token, sample_transaction, send, with_bearer},
    mocks::MockTransactionManager,
};
use crate::{
    routes::{SwiftSubmitRoute, TransactionHistoryRoute, TransactionsRoute, UpdateTransactionStatusRoute},
    server::{json_config, path_config, query_config},
};

fn configure(db: MockTransactionManager) -> impl FnOnce(&mut ServiceConfig) {
    api_scope(move |cfg| {
        cfg.app_data(web::Data::new(PaymentFlowApi::new(db)))
            .app_data(json_config())
            .app_data(path_config())
            .app_data(query_config())
            .service(TransactionsRoute::<MockTransactionManager>::new())
            .service(UpdateTransactionStatusRoute::<MockTransactionManager>::new())
            .service(TransactionHistoryRoute::<MockTransactionManager>::new())
            .service(SwiftSubmitRoute::<MockTransactionManager>::new());
    })
}

fn json_request(req: TestRequest, token: &str, body: &str) -> TestRequest {
    with_bearer(req.insert_header(("Content-Type", "application/json")).set_payload(body.to_string()), token)
}

fn put_status(id: &str, token: &str, body: &str) -> TestRequest {
    json_request(TestRequest::put().uri(&format!("/api/transactions/{id}/status")), token, body)
}

fn swift_submit(token: &str, body: &str) -> TestRequest {
    json_request(TestRequest::post().uri("/api/swift-submit"), token, body)
}

//----------------------------------------------   Listing  ----------------------------------------------------

#[actix_web::test]
async fn employee_lists_transactions() {
    let _ = env_logger::try_init().ok();
    let mut db = MockTransactionManager::new();
    db.expect_search_transactions().withf(|q| q.is_empty()).times(1).returning(|_| {
        Ok(vec![
            TransactionDetail {
                transaction: sample_transaction(2, TransactionStatus::Verified),
                customer_full_name: "Jane Doe".into(),
            },
            TransactionDetail {
                transaction: sample_transaction(1, TransactionStatus::Pending),
                customer_full_name: "Jane Doe".into(),
            },
        ])
    });
    let req = with_bearer(TestRequest::get().uri("/api/transactions"), &employee_token());
    let (status, body) = send(req, configure(db)).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    let list = json["transactions"].as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], 2);
    assert_eq!(list[0]["customerFullName"], "Jane Doe");
    assert_eq!(list[0]["amount"], "100.00");
    assert_eq!(list[0]["processedByEmployeeId"], 2);
    assert_eq!(list[1]["status"], "Pending");
}

#[actix_web::test]
async fn list_filtered_by_status() {
    let _ = env_logger::try_init().ok();
    let mut db = MockTransactionManager::new();
    db.expect_search_transactions()
        .withf(|q| q.statuses.as_deref() == Some(&[TransactionStatus::Verified][..]))
        .times(1)
        .returning(|_| Ok(vec![]));
    let req = with_bearer(TestRequest::get().uri("/api/transactions?status=Verified"), &employee_token());
    let (status, body) = send(req, configure(db)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"transactions":[]}"#);

    let mut db = MockTransactionManager::new();
    db.expect_search_transactions().never();
    let req = with_bearer(TestRequest::get().uri("/api/transactions?status=Lost"), &employee_token());
    let (status, _) = send(req, configure(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn customers_cannot_list_transactions() {
    let _ = env_logger::try_init().ok();
    let mut db = MockTransactionManager::new();
    db.expect_search_transactions().never();
    let req = with_bearer(TestRequest::get().uri("/api/transactions"), &customer_token());
    let (status, _) = send(req, configure(db)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

//----------------------------------------------   Status updates  ----------------------------------------------------

#[actix_web::test]
async fn verify_a_pending_transaction() {
    let _ = env_logger::try_init().ok();
    let mut db = MockTransactionManager::new();
    db.expect_transition_status()
        .withf(|id, from, to, employee| {
            *id == 7 &&
                *from == TransactionStatus::Pending &&
                *to == TransactionStatus::Verified &&
                *employee == 2
        })
        .times(1)
        .returning(|id, _, _, _| Ok(TransitionResult::Updated(sample_transaction(id, TransactionStatus::Verified))));
    let req = put_status("7", &employee_token(), r#"{"status":"Verified"}"#);
    let (status, body) = send(req, configure(db)).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["message"], "Transaction status updated to Verified.");
    assert_eq!(json["transaction"]["status"], "Verified");
    assert_eq!(json["transaction"]["processedByEmployeeId"], 2);
}

#[actix_web::test]
async fn verify_is_strict_about_the_current_status() {
    let _ = env_logger::try_init().ok();
    let mut db = MockTransactionManager::new();
    db.expect_transition_status()
        .returning(|_, _, _, _| Ok(TransitionResult::StatusMismatch(TransactionStatus::Completed)));
    let req = put_status("7", &employee_token(), r#"{"status":"Verified"}"#);
    let (status, body) = send(req, configure(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, r#"{"error":"Transaction #7 is Completed and cannot be moved to Verified."}"#);
}

#[actix_web::test]
async fn status_updates_on_missing_transactions() {
    let _ = env_logger::try_init().ok();
    let mut db = MockTransactionManager::new();
    db.expect_transition_status().returning(|_, _, _, _| Ok(TransitionResult::NotFound));
    let req = put_status("99", &employee_token(), r#"{"status":"Completed"}"#);
    let (status, _) = send(req, configure(db)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn unsupported_status_requests() {
    let _ = env_logger::try_init().ok();
    for payload in [r#"{"status":"Pending"}"#, r#"{"status":"Rejected"}"#, r#"{"status":""}"#, "{}"] {
        let mut db = MockTransactionManager::new();
        db.expect_transition_status().never();
        let req = put_status("7", &employee_token(), payload);
        let (status, _) = send(req, configure(db)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
    }
    let mut db = MockTransactionManager::new();
    db.expect_transition_status().never();
    let req = put_status("seven", &employee_token(), r#"{"status":"Verified"}"#);
    let (status, _) = send(req, configure(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn customers_cannot_verify() {
    let _ = env_logger::try_init().ok();
    let mut db = MockTransactionManager::new();
    db.expect_transition_status().never();
    let req = put_status("7", &customer_token(), r#"{"status":"Verified"}"#);
    let (status, _) = send(req, configure(db)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

//----------------------------------------------   History  ----------------------------------------------------

#[actix_web::test]
async fn transaction_history() {
    let _ = env_logger::try_init().ok();
    let mut db = MockTransactionManager::new();
    db.expect_fetch_transaction().returning(|id| Ok(Some(sample_transaction(id, TransactionStatus::Completed))));
    db.expect_fetch_status_history().returning(|id| {
        let change = |n: i64, from, to| StatusChange {
            id: n,
            transaction_id: id,
            from_status: from,
            to_status: to,
            employee_id: 2,
            changed_at: Utc::now(),
        };
        Ok(vec![
            change(1, TransactionStatus::Pending, TransactionStatus::Verified),
            change(2, TransactionStatus::Verified, TransactionStatus::Completed),
        ])
    });
    let req = with_bearer(TestRequest::get().uri("/api/transactions/3/history"), &employee_token());
    let (status, body) = send(req, configure(db)).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    let history = json["history"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["fromStatus"], "Pending");
    assert_eq!(history[1]["toStatus"], "Completed");
    assert_eq!(history[1]["transactionId"], 3);
}

#[actix_web::test]
async fn history_of_missing_transaction() {
    let _ = env_logger::try_init().ok();
    let mut db = MockTransactionManager::new();
    db.expect_fetch_transaction().returning(|_| Ok(None));
    db.expect_fetch_status_history().never();
    let req = with_bearer(TestRequest::get().uri("/api/transactions/3/history"), &employee_token());
    let (status, _) = send(req, configure(db)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

//----------------------------------------------   SWIFT  ----------------------------------------------------

#[actix_web::test]
async fn swift_submit_settles_the_batch() {
    let _ = env_logger::try_init().ok();
    let mut db = MockTransactionManager::new();
    db.expect_settle_batch()
        .withf(|ids, employee| ids.to_vec() == vec![4, 5] && *employee == 2)
        .times(1)
        .returning(|ids, _| Ok(BatchSettlement::Settled(ids.len() as u64)));
    let req = swift_submit(&employee_token(), r#"{"transactionIds":[4,5,4]}"#);
    let (status, body) = send(req, configure(db)).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json, json!({"message": "Transactions submitted to SWIFT successfully.", "count": 2}));
}

#[actix_web::test]
async fn swift_submit_names_unverified_transactions() {
    let _ = env_logger::try_init().ok();
    let mut db = MockTransactionManager::new();
    db.expect_settle_batch().returning(|_, _| Ok(BatchSettlement::Unverified(vec![5])));
    let req = swift_submit(&employee_token(), r#"{"transactionIds":[4,5]}"#);
    let (status, body) = send(req, configure(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["unverifiedIds"], json!([5]));
}

#[actix_web::test]
async fn swift_submit_needs_a_selection() {
    let _ = env_logger::try_init().ok();
    for payload in [r#"{"transactionIds":[]}"#, "{}", r#"{"transactionIds":"4"}"#] {
        let mut db = MockTransactionManager::new();
        db.expect_settle_batch().never();
        let req = swift_submit(&employee_token(), payload);
        let (status, _) = send(req, configure(db)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
    }
}

#[actix_web::test]
async fn oversized_swift_batches_are_bad_requests() {
    let _ = env_logger::try_init().ok();
    let mut db = MockTransactionManager::new();
    db.expect_settle_batch().never();
    let ids = (1..=MAX_BATCH_SIZE as i64 + 1).collect::<Vec<_>>();
    let payload = json!({ "transactionIds": ids }).to_string();
    let (status, body) = send(swift_submit(&employee_token(), &payload), configure(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, format!(r#"{{"error":"At most {MAX_BATCH_SIZE} transactions can be submitted at once."}}"#));
}

#[actix_web::test]
async fn customers_cannot_submit_to_swift() {
    let _ = env_logger::try_init().ok();
    let mut db = MockTransactionManager::new();
    db.expect_settle_batch().never();
    let req = swift_submit(&customer_token(), r#"{"transactionIds":[4]}"#);
    let (status, _) = send(req, configure(db)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
