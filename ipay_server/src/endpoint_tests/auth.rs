use std::time::Duration;

use actix_web::{http::StatusCode, test, test::TestRequest, web, web::ServiceConfig, App};
use chrono::Utc;
use ipay_common::Secret;
use ipay_engine::{
    db_types::{Identity, Role, User},
    helpers::hash_password,
    traits::StoreError,
    AuthApi,
};
use jwt_compact::{
    alg::{Hs256, Hs256Key},
    AlgorithmExt,
    Claims,
    Header,
};
use serde_json::{json, Value};

use super::{
    helpers::{api_scope, get_auth_config, issue_token, sample_user, send, with_bearer},
    mocks::MockUserManager,
};
use crate::{
    auth::{JwtClaims, TokenIssuer, TokenValidator},
    config::{RateLimitConfig, ServerOptions},
    middleware::{RateLimitMiddlewareFactory, RateLimiter},
    routes::{login, register, ProfileRoute},
    server::{json_config, security_headers},
};

const JANE: &str = r#"{"fullName":"Jane Doe","idNumber":"9001010001087","accountNumber":"2000000099","password":"Abc12345!"}"#;

fn configure_register(db: MockUserManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(AuthApi::new(db)))
            .app_data(json_config())
            .service(web::resource("/api/register").route(web::post().to(register::<MockUserManager>)));
    }
}

fn configure_login(db: MockUserManager) -> impl FnOnce(&mut ServiceConfig) {
    move |cfg| {
        cfg.app_data(web::Data::new(AuthApi::new(db)))
            .app_data(web::Data::new(TokenIssuer::new(&get_auth_config())))
            .app_data(json_config())
            .service(web::resource("/api/login").route(web::post().to(login::<MockUserManager>)));
    }
}

fn post_json(path: &str, body: &str) -> TestRequest {
    TestRequest::post().uri(path).insert_header(("Content-Type", "application/json")).set_payload(body.to_string())
}

async fn jane_with_password(password: &str) -> User {
    let hash = hash_password(&Secret::from(password)).await.unwrap();
    User { password_hash: hash.reveal().clone(), ..sample_user(1, Role::Customer) }
}

//----------------------------------------------   Register  ----------------------------------------------------

#[actix_web::test]
async fn register_customer() {
    let _ = env_logger::try_init().ok();
    let mut db = MockUserManager::new();
    db.expect_insert_user()
        .withf(|u| {
            u.role == Role::Customer &&
                u.username == "2000000099" &&
                u.account_number == "2000000099" &&
                u.id_number.as_deref() == Some("9001010001087") &&
                u.password_hash.reveal().starts_with("$2")
        })
        .times(1)
        .returning(|_| Ok(sample_user(1, Role::Customer)));
    let (status, body) = send(post_json("/api/register", JANE), configure_register(db)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body, r#"{"message":"User registered successfully."}"#);
}

#[actix_web::test]
async fn register_with_invalid_fields() {
    let _ = env_logger::try_init().ok();
    let cases = [
        (r#"{"fullName":"J","idNumber":"9001010001087","accountNumber":"2000000099","password":"Abc12345!"}"#, "name"),
        (r#"{"fullName":"Jane Doe","idNumber":"900101","accountNumber":"2000000099","password":"Abc12345!"}"#, "ID"),
        (r#"{"fullName":"Jane Doe","idNumber":"9001010001087","accountNumber":"12ab","password":"Abc12345!"}"#, "ccount"),
        (r#"{"fullName":"Jane Doe","idNumber":"9001010001087","accountNumber":"2000000099","password":"abc"}"#, "assword"),
        (r#"{"fullName":"Jane Doe","accountNumber":"2000000099","password":"Abc12345!"}"#, "ID"),
    ];
    for (payload, hint) in cases {
        let mut db = MockUserManager::new();
        db.expect_insert_user().never();
        let (status, body) = send(post_json("/api/register", payload), configure_register(db)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
        let json: Value = serde_json::from_str(&body).unwrap();
        let msg = json["error"].as_str().unwrap();
        assert!(msg.contains(hint), "{msg} should mention {hint}");
    }
}

#[actix_web::test]
async fn register_duplicate_is_a_conflict() {
    let _ = env_logger::try_init().ok();
    let mut db = MockUserManager::new();
    db.expect_insert_user()
        .returning(|_| Err(StoreError::DuplicateIdentity("UNIQUE constraint failed: users.account_number".into())));
    let (status, body) = send(post_json("/api/register", JANE), configure_register(db)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(!body.contains("UNIQUE"), "storage details leaked: {body}");
}

#[actix_web::test]
async fn register_with_malformed_json() {
    let _ = env_logger::try_init().ok();
    let mut db = MockUserManager::new();
    db.expect_insert_user().never();
    let (status, body) = send(post_json("/api/register", "{not json"), configure_register(db)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert!(json["error"].as_str().unwrap().starts_with("Could not read request body"));
}

#[actix_web::test]
async fn register_is_rate_limited() {
    let _ = env_logger::try_init().ok();
    let limiter = RateLimiter::new(RateLimitConfig::new(1, Duration::from_secs(3600)));
    let mut db = MockUserManager::new();
    db.expect_insert_user().times(1).returning(|_| Ok(sample_user(1, Role::Customer)));
    let app = App::new().app_data(web::Data::new(AuthApi::new(db))).service(
        web::resource("/api/register")
            .route(web::post().to(register::<MockUserManager>))
            .wrap(RateLimitMiddlewareFactory::new(limiter, ServerOptions::default())),
    );
    let app = test::init_service(app).await;
    let res = test::call_service(&app, post_json("/api/register", JANE).to_request()).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let res = test::call_service(&app, post_json("/api/register", JANE).to_request()).await;
    assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body, json!({"error": "Too many requests. Please try again later."}));
}

//----------------------------------------------   Login  ----------------------------------------------------

#[actix_web::test]
async fn login_issues_a_token() {
    let _ = env_logger::try_init().ok();
    let jane = jane_with_password("Abc12345!").await;
    let mut db = MockUserManager::new();
    db.expect_fetch_user_by_credentials()
        .withf(|u, a| u.to_string() == "2000000099" && a.to_string() == "2000000099")
        .returning(move |_, _| Ok(Some(jane.clone())));
    let payload = r#"{"username":"2000000099","accountNumber":"2000000099","password":"Abc12345!"}"#;
    let (status, body) = send(post_json("/api/login", payload), configure_login(db)).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["message"], "Login successful.");
    assert_eq!(json["role"], "customer");
    let claims = TokenValidator::new(&get_auth_config()).validate(json["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims, JwtClaims { user_id: 1, username: "2000000099".into(), role: Role::Customer });
}

#[actix_web::test]
async fn login_failures_are_indistinguishable() {
    let _ = env_logger::try_init().ok();
    let payload = r#"{"username":"2000000099","accountNumber":"2000000099","password":"Wrong123!"}"#;

    let jane = jane_with_password("Abc12345!").await;
    let mut db = MockUserManager::new();
    db.expect_fetch_user_by_credentials().returning(move |_, _| Ok(Some(jane.clone())));
    let (wrong_password_status, wrong_password_body) = send(post_json("/api/login", payload), configure_login(db)).await;

    let mut db = MockUserManager::new();
    db.expect_fetch_user_by_credentials().returning(|_, _| Ok(None));
    let (unknown_status, unknown_body) = send(post_json("/api/login", payload), configure_login(db)).await;

    assert_eq!(wrong_password_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password_body, unknown_body);
    assert_eq!(unknown_body, r#"{"error":"Invalid credentials."}"#);
}

#[actix_web::test]
async fn login_input_is_checked_before_lookup() {
    let _ = env_logger::try_init().ok();
    let cases = [
        r#"{"username":"","accountNumber":"2000000099","password":"Abc12345!"}"#,
        r#"{"username":"2000000099","accountNumber":"20-00","password":"Abc12345!"}"#,
        r#"{"username":"2000000099","accountNumber":"2000000099","password":""}"#,
        r#"{"username":"2000000099","accountNumber":"2000000099"}"#,
    ];
    for payload in cases {
        let mut db = MockUserManager::new();
        db.expect_fetch_user_by_credentials().never();
        let (status, _) = send(post_json("/api/login", payload), configure_login(db)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{payload}");
    }
}

//----------------------------------------------   Tokens  ----------------------------------------------------

fn configure_profile(db: MockUserManager) -> impl FnOnce(&mut ServiceConfig) {
    api_scope(move |cfg| {
        cfg.app_data(web::Data::new(AuthApi::new(db))).service(ProfileRoute::<MockUserManager>::new());
    })
}

fn profile_db() -> MockUserManager {
    let mut db = MockUserManager::new();
    db.expect_fetch_user_by_id().returning(|id| Ok(Some(sample_user(id, Role::Customer))));
    db
}

#[actix_web::test]
async fn profile_with_valid_token() {
    let _ = env_logger::try_init().ok();
    let token = issue_token(Identity::new(1, "2000000099", Role::Customer));
    let req = with_bearer(TestRequest::get().uri("/api/profile"), &token);
    let (status, body) = send(req, configure_profile(profile_db())).await;
    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["id"], 1);
    assert_eq!(json["fullName"], "Jane Doe");
    assert_eq!(json["role"], "customer");
    assert!(json.get("passwordHash").is_none());
}

#[actix_web::test]
async fn profile_of_deleted_user() {
    let _ = env_logger::try_init().ok();
    let mut db = MockUserManager::new();
    db.expect_fetch_user_by_id().returning(|_| Ok(None));
    let token = issue_token(Identity::new(9, "ghost", Role::Customer));
    let (status, _) = send(with_bearer(TestRequest::get().uri("/api/profile"), &token), configure_profile(db)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn missing_token_is_unauthenticated() {
    let _ = env_logger::try_init().ok();
    let (status, body) = send(TestRequest::get().uri("/api/profile"), configure_profile(profile_db())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, r#"{"error":"Access denied. No token provided."}"#);
    let req = TestRequest::get().uri("/api/profile").insert_header(("Authorization", "Bearer "));
    let (status, _) = send(req, configure_profile(profile_db())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn bad_tokens_are_forbidden() {
    let _ = env_logger::try_init().ok();
    let mut token = issue_token(Identity::new(1, "2000000099", Role::Customer));
    token.replace_range(token.len() - 10..token.len() - 5, "AAAAA");
    let (status, _) =
        send(with_bearer(TestRequest::get().uri("/api/profile"), &token), configure_profile(profile_db())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) =
        send(with_bearer(TestRequest::get().uri("/api/profile"), "nonsense"), configure_profile(profile_db())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn expired_token_is_forbidden() {
    let _ = env_logger::try_init().ok();
    let key = Hs256Key::new(get_auth_config().jwt_secret.reveal().as_bytes());
    let mut claims = Claims::new(JwtClaims { user_id: 1, username: "2000000099".into(), role: Role::Customer });
    claims.issued_at = Some(Utc::now() - chrono::Duration::minutes(61));
    claims.expiration = Some(Utc::now() - chrono::Duration::minutes(1));
    let token = Hs256.token(&Header::empty().with_token_type("JWT"), &claims, &key).unwrap();
    let (status, body) =
        send(with_bearer(TestRequest::get().uri("/api/profile"), &token), configure_profile(profile_db())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body.contains("Invalid or expired token"), "{body}");
}

#[actix_web::test]
async fn error_responses_carry_security_headers() {
    let _ = env_logger::try_init().ok();
    let app = App::new().wrap(security_headers()).configure(configure_profile(profile_db()));
    let app = test::init_service(app).await;
    let res = test::call_service(&app, TestRequest::get().uri("/api/profile").to_request()).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let headers = res.headers();
    assert_eq!(headers.get("X-Content-Type-Options").unwrap(), "nosniff");
    assert_eq!(headers.get("X-Frame-Options").unwrap(), "DENY");
    assert_eq!(headers.get("Referrer-Policy").unwrap(), "no-referrer");
}
