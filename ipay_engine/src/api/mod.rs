//! # Payments engine public API
//!
//! The `api` module exposes the programmatic API of the payments engine. Each API is created by supplying a storage
//! backend that implements the traits it needs:
//!
//! * [`auth_api`] manages the credential store: registration, employee creation and password authentication.
//! * [`payment_flow_api`] is the transaction status workflow: submit, verify, batch settlement, listing and history.
//!
//! ```rust,ignore
//! use ipay_engine::{PaymentFlowApi, SqliteDatabase};
//! let db = SqliteDatabase::new_with_url("sqlite://data/ipay_store.db", 5).await?;
//! // SqliteDatabase implements TransactionManagement
//! let api = PaymentFlowApi::new(db);
//! let transactions = api.list_transactions(&employee_identity).await?;
//! ```
pub mod auth_api;
pub mod auth_objects;
pub mod errors;
pub mod payment_flow_api;
pub mod payment_objects;
pub mod transaction_objects;
