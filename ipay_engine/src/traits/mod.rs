//! #  Storage contracts.
//!
//! This module provides the interfaces that define the contracts of the payment engine storage *backends*.
//!
//! * [`UserManagement`] is the credential store. Users are inserted with uniqueness checks and looked up, but never
//!   updated or deleted.
//! * [`TransactionManagement`] is the transaction store. It owns payment records and every status transition. Each
//!   transition is conditional on the expected current status and writes one audit row in the same store transaction.
//!
//! Both traits report failures as a [`StoreError`]. Backends must map uniqueness violations to
//! [`StoreError::DuplicateIdentity`] and keep storage-engine details inside [`StoreError::DatabaseError`].
mod data_objects;
mod errors;
mod transaction_management;
mod user_management;

pub use data_objects::{BatchSettlement, TransitionResult};
pub use errors::StoreError;
pub use transaction_management::TransactionManagement;
pub use user_management::UserManagement;
