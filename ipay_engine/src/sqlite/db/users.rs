use chrono::Utc;
use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewUser, User},
    traits::StoreError,
};

/// Inserts a new user. Unique constraints on `username`, `account_number` and `id_number` are enforced by the
/// database, so a collision on any of them fails the whole insert with [`StoreError::DuplicateIdentity`].
pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, StoreError> {
    let user: User = sqlx::query_as(
        r#"
            INSERT INTO users (
                full_name,
                id_number,
                account_number,
                username,
                password_hash,
                role,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *;
        "#,
    )
    .bind(user.full_name)
    .bind(user.id_number)
    .bind(user.account_number)
    .bind(user.username)
    .bind(user.password_hash.reveal().as_str())
    .bind(user.role)
    .bind(Utc::now())
    .fetch_one(conn)
    .await?;
    debug!("🗃️ New {} #{} ({}) created", user.role, user.id, user.username);
    Ok(user)
}

pub async fn fetch_user_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, StoreError> {
    let user = sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(id).fetch_optional(conn).await?;
    Ok(user)
}

pub async fn fetch_user_by_credentials(
    username: &str,
    account_number: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<User>, StoreError> {
    let user = sqlx::query_as("SELECT * FROM users WHERE username = $1 AND account_number = $2")
        .bind(username)
        .bind(account_number)
        .fetch_optional(conn)
        .await?;
    Ok(user)
}

pub async fn count_users(conn: &mut SqliteConnection) -> Result<i64, StoreError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(conn).await?;
    Ok(count)
}
