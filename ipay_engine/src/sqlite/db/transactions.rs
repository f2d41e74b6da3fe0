use std::collections::HashSet;

use chrono::Utc;
use log::{debug, trace};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    api::transaction_objects::TransactionQueryFilter,
    db_types::{NewTransaction, Transaction, TransactionDetail, TransactionStatus},
    traits::StoreError,
};

/// Inserts a new transaction. The status is always `Pending` on insert.
pub async fn insert_transaction(
    transaction: NewTransaction,
    conn: &mut SqliteConnection,
) -> Result<Transaction, StoreError> {
    let transaction: Transaction = sqlx::query_as(
        r#"
            INSERT INTO transactions (
                customer_id,
                amount,
                currency,
                provider,
                payee_account,
                swift_code,
                status,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *;
        "#,
    )
    .bind(transaction.customer_id)
    .bind(transaction.amount)
    .bind(transaction.currency)
    .bind(transaction.provider)
    .bind(transaction.payee_account)
    .bind(transaction.swift_code)
    .bind(TransactionStatus::Pending)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    debug!(
        "🗃️ Transaction #{} for {} {} saved for customer #{}",
        transaction.id, transaction.amount, transaction.currency, transaction.customer_id
    );
    Ok(transaction)
}

pub async fn fetch_transaction(id: i64, conn: &mut SqliteConnection) -> Result<Option<Transaction>, StoreError> {
    let transaction = sqlx::query_as("SELECT * FROM transactions WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(transaction)
}

/// Fetches transactions according to the criteria in the `TransactionQueryFilter`, joined with the owner's name.
///
/// Results are ordered newest first.
pub async fn search_transactions(
    query: TransactionQueryFilter,
    conn: &mut SqliteConnection,
) -> Result<Vec<TransactionDetail>, StoreError> {
    let mut builder = QueryBuilder::<Sqlite>::new(
        r#"
    SELECT transactions.*, users.full_name AS customer_full_name
    FROM transactions JOIN users ON users.id = transactions.customer_id
    "#,
    );
    if !query.is_empty() {
        builder.push("WHERE ");
    }
    let mut where_clause = builder.separated(" AND ");
    if let Some(cid) = query.customer_id {
        where_clause.push("transactions.customer_id = ");
        where_clause.push_bind_unseparated(cid);
    }
    if let Some(statuses) = query.statuses.filter(|s| !s.is_empty()) {
        where_clause.push("transactions.status IN (");
        for (i, status) in statuses.into_iter().enumerate() {
            if i > 0 {
                where_clause.push_unseparated(", ");
            }
            where_clause.push_bind_unseparated(status);
        }
        where_clause.push_unseparated(")");
    }
    if let Some(ids) = query.ids.filter(|ids| !ids.is_empty()) {
        where_clause.push("transactions.id IN (");
        for (i, id) in ids.into_iter().enumerate() {
            if i > 0 {
                where_clause.push_unseparated(", ");
            }
            where_clause.push_bind_unseparated(id);
        }
        where_clause.push_unseparated(")");
    }
    builder.push(" ORDER BY transactions.created_at DESC, transactions.id DESC");

    trace!("🗃️ Executing query: {}", builder.sql());
    let transactions = builder.build_query_as::<TransactionDetail>().fetch_all(conn).await?;
    trace!("🗃️ Result of search_transactions: {}", transactions.len());
    Ok(transactions)
}

/// Sets the status of transaction `id` to `to`, but only if its current status is `from`. Returns the updated record,
/// or `None` if no row matched.
pub(crate) async fn update_status_if(
    id: i64,
    from: TransactionStatus,
    to: TransactionStatus,
    employee_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Option<Transaction>, StoreError> {
    let transaction = sqlx::query_as(
        r#"
            UPDATE transactions SET status = $1, processed_by_employee_id = $2
            WHERE id = $3 AND status = $4
            RETURNING *;
        "#,
    )
    .bind(to)
    .bind(employee_id)
    .bind(id)
    .bind(from)
    .fetch_optional(conn)
    .await?;
    Ok(transaction)
}

/// Marks every `Verified` transaction in `ids` as `Completed`. Returns the ids that were NOT updated, in the order
/// they appear in `ids`. The caller must roll back if that list is non-empty.
pub(crate) async fn complete_verified(
    ids: &[i64],
    employee_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<i64>, StoreError> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    let mut builder = QueryBuilder::<Sqlite>::new("UPDATE transactions SET status = ");
    builder.push_bind(TransactionStatus::Completed);
    builder.push(", processed_by_employee_id = ");
    builder.push_bind(employee_id);
    builder.push(" WHERE status = ");
    builder.push_bind(TransactionStatus::Verified);
    builder.push(" AND id IN (");
    let mut id_list = builder.separated(", ");
    for id in ids {
        id_list.push_bind(*id);
    }
    id_list.push_unseparated(") RETURNING id");
    let updated: Vec<i64> = builder.build_query_scalar().fetch_all(conn).await?;
    let updated = updated.into_iter().collect::<HashSet<i64>>();
    let missing = ids.iter().copied().filter(|id| !updated.contains(id)).collect();
    Ok(missing)
}
