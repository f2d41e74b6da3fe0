//! International Payments Engine
//!
//! This library contains the core logic of the international payments portal. It is transport-agnostic: the REST
//! server in `ipay_server` and the administrative tools in `ipaytools` are both thin layers over it.
//!
//! The library is divided into these main sections:
//! 1. The data model ([`mod@db_types`]) and field validation ([`mod@validation`]).
//! 2. Storage contracts ([`mod@traits`]) and the SQLite backend ([`SqliteDatabase`]). You should never need to touch
//!    the database directly. Use the public API instead.
//! 3. The public API. [`AuthApi`] manages user accounts and password authentication. [`PaymentFlowApi`] runs the
//!    transaction status workflow (`Pending` → `Verified` → `Completed`) and enforces which role may do what.
mod api;

pub mod db_types;
pub mod helpers;
#[cfg(feature = "sqlite")]
mod sqlite;
pub mod traits;
pub mod validation;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use api::{
    auth_api::AuthApi,
    auth_objects,
    errors::{AuthApiError, PaymentFlowError},
    payment_flow_api::{PaymentFlowApi, MAX_BATCH_SIZE},
    payment_objects,
    transaction_objects,
};
#[cfg(feature = "sqlite")]
pub use sqlite::{db::SQLITE_DB_URL, SqliteDatabase};
pub use traits::{BatchSettlement, StoreError, TransactionManagement, TransitionResult, UserManagement};
