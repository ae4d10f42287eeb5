use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Transaction error: {0}")]
    Transaction(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23505")
        )
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self,
            StorageError::Database(sqlx::Error::Database(e))
                if e.code().as_deref() == Some("23503")
        )
    }

    /// Maps unique violations on card writes to `ConstraintViolation`, naming the
    /// constraint when Postgres reports it.
    pub(crate) fn from_card_write(error: sqlx::Error) -> Self {
        let constraint = match &error {
            sqlx::Error::Database(db_err) => db_err.constraint().map(str::to_string),
            _ => None,
        };
        let error = StorageError::from(error);
        if error.is_unique_violation() {
            return StorageError::ConstraintViolation(format!(
                "Card violates {}",
                constraint.as_deref().unwrap_or("cards unique key")
            ));
        }
        error
    }

    pub(crate) fn from_instance_write(error: sqlx::Error) -> Self {
        let error = StorageError::from(error);
        if error.is_foreign_key_violation() {
            return StorageError::ConstraintViolation(
                "Card instance references a missing card or collection".to_string(),
            );
        }
        error
    }
}
