use thiserror::Error;

/// Unified error type for database operations that application code can handle
#[derive(Error, Debug)]
pub enum DbError {
    /// Entity not found by the given identifier
    #[error("Entity not found")]
    NotFound,

    /// Unique constraint violation
    #[error("Unique constraint violation")]
    UniqueViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Foreign key constraint violation
    #[error("Foreign key constraint violation")]
    ForeignKeyViolation { message: String },

    /// Check constraint violation
    #[error("Check constraint violation")]
    CheckViolation {
        constraint: Option<String>,
        table: Option<String>,
        message: String,
    },

    /// Catch-all for non-recoverable errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Convert from sqlx::Error using proper sqlx error categorization
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => DbError::NotFound,
            sqlx::Error::Database(db_err) => {
                if db_err.is_unique_violation() {
                    // SQLite reports neither constraint name nor table through the
                    // driver; both live in the message text, e.g.
                    // "UNIQUE constraint failed: restaurants.email"
                    let (table, column) = parse_constraint_target(db_err.message());
                    DbError::UniqueViolation {
                        constraint: column,
                        table,
                        message: db_err.message().to_string(),
                    }
                } else if db_err.is_foreign_key_violation() {
                    // SQLite's FK failures carry no target at all, just
                    // "FOREIGN KEY constraint failed"
                    DbError::ForeignKeyViolation {
                        message: db_err.message().to_string(),
                    }
                } else if db_err.is_check_violation() {
                    let (table, column) = parse_constraint_target(db_err.message());
                    DbError::CheckViolation {
                        constraint: column,
                        table,
                        message: db_err.message().to_string(),
                    }
                } else {
                    // All other database errors are non-recoverable - convert to anyhow
                    DbError::Other(anyhow::Error::from(err))
                }
            }
            // All other sqlx errors are non-recoverable - convert to anyhow with context
            _ => DbError::Other(anyhow::Error::from(err)),
        }
    }
}

/// Extract the target of an SQLite constraint failure from its message.
/// Unique violations name `table.column` (first one wins for multi-column
/// constraints); unnamed CHECK constraints name only the table.
fn parse_constraint_target(message: &str) -> (Option<String>, Option<String>) {
    let Some(rest) = message.split("failed: ").nth(1) else {
        return (None, None);
    };
    let first = rest.split(',').next().unwrap_or(rest).trim();
    if first.is_empty() {
        return (None, None);
    }
    match first.split_once('.') {
        Some((table, column)) => (Some(table.to_string()), Some(column.to_string())),
        None => (Some(first.to_string()), None),
    }
}

/// Type alias for database operation results
pub type Result<T> = std::result::Result<T, DbError>;
