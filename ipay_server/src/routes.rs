//! Request handler definitions
//!
//! Define each route and its handler here. Handlers stay thin: they unpack the request, call the engine API and shape
//! the response. Workflow rules live in `ipay_engine`.
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause the
//! current worker to stop processing new requests. Database calls are async, and password hashing is moved onto the
//! blocking pool by the engine, so none of the handlers below block.
use actix_web::{get, web, HttpResponse, Responder};
use ipay_engine::{
    auth_objects::{LoginRequest, RegistrationRequest},
    db_types::{Identity, Role, TransactionStatus},
    payment_objects::{BatchSubmissionRequest, NewPaymentRequest, StatusUpdateRequest},
    traits::{TransactionManagement, UserManagement},
    transaction_objects::TransactionQueryFilter,
    validation::ValidationError,
    AuthApi,
    PaymentFlowApi,
};
use log::*;

use crate::{
    auth::{JwtClaims, TokenIssuer},
    data_objects::{
        BatchResponse,
        HistoryResponse,
        JsonResponse,
        LoginResponse,
        TransactionListQuery,
        TransactionListResponse,
        TransactionResponse,
    },
    errors::ServerError,
};

// Web-actix cannot handle generics in handlers, so it's implemented manually using the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };

    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+ where requires [$($roles:expr),*])  => {
        paste::paste! { pub struct [<$name:camel Route>]<A>(core::marker::PhantomData<fn() -> A>);}
        paste::paste! { impl<A> [<$name:camel Route>]<A> {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self(core::marker::PhantomData::<fn() -> A>)
            }
        }}
        paste::paste! { impl<A> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<A>
        where
            A: $($bounds)++ 'static,
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::<A>)
                    .wrap($crate::middleware::AclMiddlewareFactory::new(&[$($roles),+]));
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Register  ----------------------------------------------------
// Mounted by hand in `server.rs` rather than with `route!`, since it sits behind its own rate limiter.
/// Route handler for customer self-registration.
///
/// The body carries `fullName`, `idNumber`, `accountNumber` and `password`. The account number doubles as the
/// username. Every field is validated before anything is written, and a clash with an existing username, account
/// number or ID number is reported as a single 409 Conflict.
pub async fn register<B: UserManagement>(
    api: web::Data<AuthApi<B>>,
    body: web::Json<RegistrationRequest>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received registration request");
    let user = api.register(body.into_inner()).await?;
    debug!("💻️ Registered customer #{}", user.id);
    Ok(HttpResponse::Created().json(JsonResponse::new("User registered successfully.")))
}

//----------------------------------------------   Login  ----------------------------------------------------
/// Route handler for the login endpoint.
///
/// Users supply `username`, `accountNumber` and `password`. Both identifiers must belong to the same user. An unknown
/// user and a wrong password produce the same 401 response.
///
/// On success the server issues a JWT access token carrying the user's id, username and role. The token is valid for
/// one hour and will NOT refresh.
pub async fn login<B: UserManagement>(
    api: web::Data<AuthApi<B>>,
    signer: web::Data<TokenIssuer>,
    body: web::Json<LoginRequest>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Received login request");
    let identity = api.authenticate(body.into_inner()).await?;
    let role = identity.role;
    let token = signer.issue_token(identity)?;
    trace!("💻️ Issued access token");
    Ok(HttpResponse::Ok().json(LoginResponse { message: "Login successful.".into(), token, role }))
}

//----------------------------------------------   Profile  ----------------------------------------------------
route!(profile => Get "/profile" impl UserManagement);
pub async fn profile<B: UserManagement>(
    claims: JwtClaims,
    api: web::Data<AuthApi<B>>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET profile for user #{}", claims.user_id);
    let profile = api.profile(&Identity::from(claims)).await?;
    Ok(HttpResponse::Ok().json(profile))
}

//----------------------------------------------   Payments  ----------------------------------------------------
route!(submit_payment => Post "/payments" impl TransactionManagement where requires [Role::Customer]);
/// Route handler for payment submission. Customers only.
///
/// The amount may be sent as a string (`"100.00"`) or a number (`100.5`). The new transaction starts out `Pending`.
pub async fn submit_payment<B: TransactionManagement>(
    claims: JwtClaims,
    api: web::Data<PaymentFlowApi<B>>,
    body: web::Json<NewPaymentRequest>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ Payment submission from customer #{}", claims.user_id);
    let transaction = api.submit_payment(&Identity::from(claims), body.into_inner()).await?;
    Ok(HttpResponse::Created()
        .json(TransactionResponse { message: "Payment submitted successfully.".into(), transaction }))
}

//----------------------------------------------   Transactions  ----------------------------------------------------
route!(transactions => Get "/transactions" impl TransactionManagement where requires [Role::Employee]);
/// Lists transactions, newest first. An optional `status` query parameter narrows the list to one status.
pub async fn transactions<B: TransactionManagement>(
    claims: JwtClaims,
    api: web::Data<PaymentFlowApi<B>>,
    query: web::Query<TransactionListQuery>,
) -> Result<HttpResponse, ServerError> {
    trace!("💻️ GET transactions for employee #{}", claims.user_id);
    let identity = Identity::from(claims);
    let transactions = match query.into_inner().status {
        None => api.list_transactions(&identity).await?,
        Some(status) => {
            let status = status
                .parse::<TransactionStatus>()
                .map_err(|_| ServerError::InvalidInput(ValidationError::UnsupportedStatus(status).to_string()))?;
            api.search_transactions(&identity, TransactionQueryFilter::default().with_status(status)).await?
        },
    };
    Ok(HttpResponse::Ok().json(TransactionListResponse { transactions }))
}

route!(update_transaction_status => Put "/transactions/{id}/status" impl TransactionManagement where requires [Role::Employee]);
/// Moves a single transaction forward. `Verified` requires the transaction to be `Pending`; `Completed` requires it to
/// be `Verified`. Anything else is rejected.
pub async fn update_transaction_status<B: TransactionManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<PaymentFlowApi<B>>,
    body: web::Json<StatusUpdateRequest>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    let StatusUpdateRequest { status } = body.into_inner();
    debug!("💻️ Employee #{} requested status {status} for transaction #{id}", claims.user_id);
    let transaction = api.update_status(&Identity::from(claims), id, &status).await?;
    let message = format!("Transaction status updated to {}.", transaction.status);
    Ok(HttpResponse::Ok().json(TransactionResponse { message, transaction }))
}

route!(transaction_history => Get "/transactions/{id}/history" impl TransactionManagement where requires [Role::Employee]);
pub async fn transaction_history<B: TransactionManagement>(
    claims: JwtClaims,
    path: web::Path<i64>,
    api: web::Data<PaymentFlowApi<B>>,
) -> Result<HttpResponse, ServerError> {
    let id = path.into_inner();
    trace!("💻️ GET history for transaction #{id}");
    let history = api.transaction_history(&Identity::from(claims), id).await?;
    Ok(HttpResponse::Ok().json(HistoryResponse { history }))
}

//----------------------------------------------   Settlement  ----------------------------------------------------
route!(swift_submit => Post "/swift-submit" impl TransactionManagement where requires [Role::Employee]);
/// Submits a batch of verified transactions to SWIFT. All or nothing: if any id is not `Verified`, nothing changes and
/// the response lists the offending ids under `unverifiedIds`.
pub async fn swift_submit<B: TransactionManagement>(
    claims: JwtClaims,
    api: web::Data<PaymentFlowApi<B>>,
    body: web::Json<BatchSubmissionRequest>,
) -> Result<HttpResponse, ServerError> {
    let BatchSubmissionRequest { transaction_ids } = body.into_inner();
    debug!("💻️ Employee #{} submitting {} transactions to SWIFT", claims.user_id, transaction_ids.len());
    let count = api.submit_batch(&Identity::from(claims), &transaction_ids).await?;
    Ok(HttpResponse::Ok().json(BatchResponse { message: "Transactions submitted to SWIFT successfully.".into(), count }))
}
