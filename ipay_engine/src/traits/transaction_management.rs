use crate::{
    api::transaction_objects::TransactionQueryFilter,
    db_types::{NewTransaction, StatusChange, Transaction, TransactionDetail, TransactionStatus},
    traits::{BatchSettlement, StoreError, TransitionResult},
};

/// The `TransactionManagement` trait defines the behaviour of the transaction store.
///
/// Backends are responsible for making status transitions safe under concurrency. Every transition must be a
/// conditional update on the expected current status, and must append one [`StatusChange`] row in the same atomic
/// unit of work.
#[allow(async_fn_in_trait)]
pub trait TransactionManagement {
    /// Stores a new transaction with status `Pending` and no processing employee.
    async fn insert_transaction(&self, transaction: NewTransaction) -> Result<Transaction, StoreError>;

    async fn fetch_transaction(&self, id: i64) -> Result<Option<Transaction>, StoreError>;

    /// Fetches transactions matching the filter, joined with their owner's full name. Results are ordered newest
    /// first by `created_at`, with ties broken by the newest id.
    async fn search_transactions(&self, query: TransactionQueryFilter) -> Result<Vec<TransactionDetail>, StoreError>;

    /// Moves transaction `id` from `from` to `to`, stamping `employee_id` as the processor. The update only happens
    /// if the current status is `from`.
    async fn transition_status(
        &self,
        id: i64,
        from: TransactionStatus,
        to: TransactionStatus,
        employee_id: i64,
    ) -> Result<TransitionResult, StoreError>;

    /// Moves every transaction in `ids` from `Verified` to `Completed` in one atomic unit of work. If any id is not
    /// currently `Verified`, nothing is modified and those ids are returned in [`BatchSettlement::Unverified`].
    ///
    /// `ids` must not contain duplicates.
    async fn settle_batch(&self, ids: &[i64], employee_id: i64) -> Result<BatchSettlement, StoreError>;

    /// The status history of the transaction, oldest first.
    async fn fetch_status_history(&self, id: i64) -> Result<Vec<StatusChange>, StoreError>;
}
