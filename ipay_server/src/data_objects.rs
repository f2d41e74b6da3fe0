use std::fmt::Display;

use ipay_engine::db_types::{Role, StatusChange, Transaction, TransactionDetail};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonResponse {
    pub message: String,
}

impl JsonResponse {
    pub fn new<S: Display>(message: S) -> Self {
        Self { message: message.to_string() }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionResponse {
    pub message: String,
    pub transaction: Transaction,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<TransactionDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchResponse {
    pub message: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HistoryResponse {
    pub history: Vec<StatusChange>,
}

/// Query parameters for `GET /api/transactions`. Without a `status`, every transaction is listed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionListQuery {
    pub status: Option<String>,
}
