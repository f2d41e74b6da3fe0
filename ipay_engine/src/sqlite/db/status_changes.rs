use chrono::Utc;
use sqlx::SqliteConnection;

use crate::{
    db_types::{StatusChange, TransactionStatus},
    traits::StoreError,
};

/// Appends an entry to the status history. Call this inside the same transaction as the status update it records.
pub(crate) async fn record_change(
    transaction_id: i64,
    from: TransactionStatus,
    to: TransactionStatus,
    employee_id: i64,
    conn: &mut SqliteConnection,
) -> Result<StatusChange, StoreError> {
    let change = sqlx::query_as(
        r#"
            INSERT INTO status_changes (transaction_id, from_status, to_status, employee_id, changed_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(transaction_id)
    .bind(from)
    .bind(to)
    .bind(employee_id)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    Ok(change)
}

/// The history of a transaction, oldest first.
pub async fn history_for_transaction(
    transaction_id: i64,
    conn: &mut SqliteConnection,
) -> Result<Vec<StatusChange>, StoreError> {
    let changes = sqlx::query_as("SELECT * FROM status_changes WHERE transaction_id = $1 ORDER BY id ASC")
        .bind(transaction_id)
        .fetch_all(conn)
        .await?;
    Ok(changes)
}
