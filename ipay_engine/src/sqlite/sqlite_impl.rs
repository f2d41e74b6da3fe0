//! `SqliteDatabase` is a concrete implementation of a payments engine backend.
//!
//! It uses SQLite as the backend and implements all the traits defined in the [`crate::traits`] module.
use std::fmt::Debug;

use log::*;
use sqlx::{migrate::MigrateError, SqlitePool};

use super::db::{db_url, new_pool, status_changes, transactions, users};
use crate::{
    api::transaction_objects::TransactionQueryFilter,
    db_types::{NewTransaction, NewUser, StatusChange, Transaction, TransactionDetail, TransactionStatus, User},
    traits::{BatchSettlement, StoreError, TransactionManagement, TransitionResult, UserManagement},
};

#[derive(Clone)]
pub struct SqliteDatabase {
    url: String,
    pool: SqlitePool,
}

impl Debug for SqliteDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SqliteDatabase ({:?})", self.pool)
    }
}

impl UserManagement for SqliteDatabase {
    /// Inserts run in an explicit transaction so the new row is visible to every pooled connection once this returns.
    async fn insert_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tx = self.pool.begin().await?;
        let user = users::insert_user(user, &mut tx).await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn fetch_user_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user_by_id(id, &mut conn).await
    }

    async fn fetch_user_by_credentials(
        &self,
        username: &str,
        account_number: &str,
    ) -> Result<Option<User>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        users::fetch_user_by_credentials(username, account_number, &mut conn).await
    }

    async fn count_users(&self) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        users::count_users(&mut conn).await
    }
}

impl TransactionManagement for SqliteDatabase {
    async fn insert_transaction(&self, transaction: NewTransaction) -> Result<Transaction, StoreError> {
        let mut tx = self.pool.begin().await?;
        let transaction = transactions::insert_transaction(transaction, &mut tx).await?;
        tx.commit().await?;
        Ok(transaction)
    }

    async fn fetch_transaction(&self, id: i64) -> Result<Option<Transaction>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        transactions::fetch_transaction(id, &mut conn).await
    }

    async fn search_transactions(&self, query: TransactionQueryFilter) -> Result<Vec<TransactionDetail>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        transactions::search_transactions(query, &mut conn).await
    }

    /// The conditional update runs first, so the write lock is taken up front and concurrent transitions on the same
    /// row serialise on it. Only one of them can observe the expected status.
    async fn transition_status(
        &self,
        id: i64,
        from: TransactionStatus,
        to: TransactionStatus,
        employee_id: i64,
    ) -> Result<TransitionResult, StoreError> {
        let mut tx = self.pool.begin().await?;
        match transactions::update_status_if(id, from, to, employee_id, &mut tx).await? {
            Some(updated) => {
                status_changes::record_change(id, from, to, employee_id, &mut tx).await?;
                tx.commit().await?;
                debug!("🗃️ Transaction #{id} moved from {from} to {to} by employee #{employee_id}");
                Ok(TransitionResult::Updated(updated))
            },
            None => {
                let existing = transactions::fetch_transaction(id, &mut tx).await?;
                tx.rollback().await?;
                let result = match existing {
                    Some(t) => {
                        debug!("🗃️ Transaction #{id} is {} and cannot move from {from} to {to}", t.status);
                        TransitionResult::StatusMismatch(t.status)
                    },
                    None => TransitionResult::NotFound,
                };
                Ok(result)
            },
        }
    }

    async fn settle_batch(&self, ids: &[i64], employee_id: i64) -> Result<BatchSettlement, StoreError> {
        let mut tx = self.pool.begin().await?;
        let unverified = transactions::complete_verified(ids, employee_id, &mut tx).await?;
        if !unverified.is_empty() {
            tx.rollback().await?;
            debug!("🗃️ Batch of {} rolled back. Not verified: {unverified:?}", ids.len());
            return Ok(BatchSettlement::Unverified(unverified));
        }
        for id in ids {
            status_changes::record_change(
                *id,
                TransactionStatus::Verified,
                TransactionStatus::Completed,
                employee_id,
                &mut tx,
            )
            .await?;
        }
        tx.commit().await?;
        debug!("🗃️ Batch of {} transactions completed by employee #{employee_id}", ids.len());
        Ok(BatchSettlement::Settled(ids.len() as u64))
    }

    async fn fetch_status_history(&self, id: i64) -> Result<Vec<StatusChange>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        status_changes::history_for_transaction(id, &mut conn).await
    }
}

impl SqliteDatabase {
    /// Creates a new database API object, using the URL in `IPAY_DATABASE_URL`.
    pub async fn new(max_connections: u32) -> Result<Self, sqlx::Error> {
        let url = db_url();
        SqliteDatabase::new_with_url(url.as_str(), max_connections).await
    }

    pub async fn new_with_url(url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        trace!("🗃️ Creating new database connection pool with url {url}");
        let pool = new_pool(url, max_connections).await?;
        let url = url.to_string();
        Ok(Self { url, pool })
    }

    pub fn url(&self) -> &str {
        self.url.as_str()
    }

    /// Brings the schema up to date. Safe to call on every start.
    pub async fn migrate(&self) -> Result<(), MigrateError> {
        sqlx::migrate!("./src/sqlite/migrations").run(&self.pool).await?;
        info!("🗃️ Database migrations complete");
        Ok(())
    }

    /// Returns a reference to the database connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
