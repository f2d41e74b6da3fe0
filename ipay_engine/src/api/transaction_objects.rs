use serde::{Deserialize, Serialize};

use crate::db_types::TransactionStatus;

/// Search criteria for transactions. An empty filter matches everything.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TransactionQueryFilter {
    pub customer_id: Option<i64>,
    pub statuses: Option<Vec<TransactionStatus>>,
    pub ids: Option<Vec<i64>>,
}

impl TransactionQueryFilter {
    pub fn with_customer_id(mut self, customer_id: i64) -> Self {
        self.customer_id = Some(customer_id);
        self
    }

    pub fn with_status(mut self, status: TransactionStatus) -> Self {
        self.statuses.get_or_insert_with(Vec::new).push(status);
        self
    }

    pub fn with_ids(mut self, ids: &[i64]) -> Self {
        self.ids.get_or_insert_with(Vec::new).extend_from_slice(ids);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.customer_id.is_none()
            && self.statuses.as_ref().map(|s| s.is_empty()).unwrap_or(true)
            && self.ids.as_ref().map(|ids| ids.is_empty()).unwrap_or(true)
    }
}
