use serde::Serialize;

use crate::db_types::{Transaction, TransactionStatus};

/// The outcome of a conditional single-row status transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionResult {
    /// The row had the expected status and has been moved on. Contains the updated record.
    Updated(Transaction),
    /// No transaction with the given id exists.
    NotFound,
    /// The transaction exists, but its current status is not the expected one. Nothing was changed.
    StatusMismatch(TransactionStatus),
}

/// The outcome of an all-or-nothing batch settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BatchSettlement {
    /// Every requested transaction was `Verified` and is now `Completed`. Contains the number of rows modified.
    Settled(u64),
    /// At least one requested id was not `Verified` (or does not exist). Contains exactly those ids, in request
    /// order. Nothing was modified.
    Unverified(Vec<i64>),
}

impl BatchSettlement {
    pub fn is_settled(&self) -> bool {
        matches!(self, BatchSettlement::Settled(_))
    }
}
