use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("A record with the same identifying fields already exists. {0}")]
    DuplicateIdentity(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::DuplicateIdentity(db.message().to_string())
            },
            _ => StoreError::DatabaseError(e.to_string()),
        }
    }
}
