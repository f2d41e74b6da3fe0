use thiserror::Error;

use crate::{db_types::TransactionStatus, traits::StoreError, validation::ValidationError};

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("{0}")]
    InvalidInput(#[from] ValidationError),
    /// Deliberately vague. Callers must not be able to tell an unknown user from a wrong password.
    #[error("Invalid credentials.")]
    InvalidCredentials,
    #[error("A user with this username, account number or ID number already exists.")]
    DuplicateIdentity,
    #[error("User #{0} does not exist.")]
    UserNotFound(i64),
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("Could not hash or verify password: {0}")]
    HashingError(String),
}

impl From<StoreError> for AuthApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::DuplicateIdentity(_) => AuthApiError::DuplicateIdentity,
            StoreError::DatabaseError(s) => AuthApiError::DatabaseError(s),
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum PaymentFlowError {
    #[error("You do not have permission to perform this action.")]
    Forbidden,
    #[error("{0}")]
    InvalidInput(#[from] ValidationError),
    #[error("Transaction #{0} does not exist.")]
    NotFound(i64),
    #[error("Transaction #{id} is {current} and cannot be moved to {requested}.")]
    InvalidTransition { id: i64, current: TransactionStatus, requested: TransactionStatus },
    #[error("Some transactions are not verified: {0:?}")]
    PreconditionFailed(Vec<i64>),
    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<StoreError> for PaymentFlowError {
    fn from(e: StoreError) -> Self {
        PaymentFlowError::DatabaseError(e.to_string())
    }
}
