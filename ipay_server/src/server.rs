use std::time::Duration;

use actix_cors::Cors;
use actix_web::{
    dev::Server,
    http::KeepAlive,
    middleware::{DefaultHeaders, Logger},
    web,
    App,
    HttpServer,
};
use ipay_engine::{
    traits::{TransactionManagement, UserManagement},
    AuthApi,
    PaymentFlowApi,
    SqliteDatabase,
};
use log::*;

use crate::{
    auth::{TokenIssuer, TokenValidator},
    config::{ServerConfig, ServerOptions},
    errors::ServerError,
    middleware::{JwtMiddlewareFactory, RateLimitMiddlewareFactory, RateLimiter},
    routes::{
        health,
        login,
        register,
        ProfileRoute,
        SubmitPaymentRoute,
        SwiftSubmitRoute,
        TransactionHistoryRoute,
        TransactionsRoute,
        UpdateTransactionStatusRoute,
    },
};

const MAX_DB_CONNECTIONS: u32 = 25;

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let db = SqliteDatabase::new_with_url(&config.database_url, MAX_DB_CONNECTIONS)
        .await
        .map_err(|e| ServerError::InitializeError(e.to_string()))?;
    db.migrate().await.map_err(|e| ServerError::InitializeError(e.to_string()))?;
    let srv = create_server_instance(config, db.clone())?;
    let result = srv.await.map_err(|e| ServerError::Unspecified(e.to_string()));
    db.close().await;
    info!("🚀️ Server stopped. Database connections closed.");
    result
}

pub fn create_server_instance(config: ServerConfig, db: SqliteDatabase) -> Result<Server, ServerError> {
    // Rate limit counters are shared by every worker, so they are created once, out here.
    let limiters = Limiters::new(&config);
    let (host, port) = (config.host.clone(), config.port);
    let srv = HttpServer::new(move || {
        let app = App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ipay::access_log"))
            .wrap(Cors::permissive())
            .wrap(security_headers());
        app.configure(configure_app(db.clone(), &config, limiters.clone()))
    })
    .keep_alive(KeepAlive::Timeout(Duration::from_secs(600)))
    .bind((host.as_str(), port))?
    .run();
    Ok(srv)
}

#[derive(Clone)]
pub struct Limiters {
    pub login: RateLimiter,
    pub register: RateLimiter,
}

impl Limiters {
    pub fn new(config: &ServerConfig) -> Self {
        Self { login: RateLimiter::new(config.login_rate), register: RateLimiter::new(config.register_rate) }
    }
}

pub fn security_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("X-Content-Type-Options", "nosniff"))
        .add(("X-Frame-Options", "DENY"))
        .add(("Referrer-Policy", "no-referrer"))
}

/// Malformed JSON bodies are reported as 400s with the usual JSON error body.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        debug!("💻️ Could not deserialize request body. {err}");
        ServerError::InvalidRequestBody(err.to_string()).into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        debug!("💻️ Could not parse request path. {err}");
        ServerError::InvalidRequestPath(err.to_string()).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| ServerError::InvalidInput(err.to_string()).into())
}

/// Registers the API data, routes and middleware for backend `B` on an app.
///
/// The public `/api/register` and `/api/login` resources are registered before the authenticated `/api` scope, since
/// actix matches services in registration order and a scope never falls through to later services.
pub fn configure_app<B>(db: B, config: &ServerConfig, limiters: Limiters) -> impl FnOnce(&mut web::ServiceConfig)
where B: UserManagement + TransactionManagement + Clone + 'static {
    let issuer = TokenIssuer::new(&config.auth);
    let validator = TokenValidator::new(&config.auth);
    let options = ServerOptions::from_config(config);
    move |cfg| {
        let auth_api = AuthApi::new(db.clone());
        let payments_api = PaymentFlowApi::new(db);
        let auth_scope = web::scope("/api")
            .wrap(JwtMiddlewareFactory::new(validator))
            .service(ProfileRoute::<B>::new())
            .service(SubmitPaymentRoute::<B>::new())
            .service(TransactionsRoute::<B>::new())
            .service(UpdateTransactionStatusRoute::<B>::new())
            .service(TransactionHistoryRoute::<B>::new())
            .service(SwiftSubmitRoute::<B>::new());
        cfg.app_data(web::Data::new(auth_api))
            .app_data(web::Data::new(payments_api))
            .app_data(web::Data::new(issuer))
            .app_data(json_config())
            .app_data(path_config())
            .app_data(query_config())
            .service(health)
            .service(
                web::resource("/api/register")
                    .name("register")
                    .route(web::post().to(register::<B>))
                    .wrap(RateLimitMiddlewareFactory::new(limiters.register, options)),
            )
            .service(
                web::resource("/api/login")
                    .name("login")
                    .route(web::post().to(login::<B>))
                    .wrap(RateLimitMiddlewareFactory::new(limiters.login, options)),
            )
            .service(auth_scope);
    }
}
