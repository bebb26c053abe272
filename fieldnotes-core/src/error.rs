use fieldnotes_model::ModelError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<ModelError> for CoreError {
    fn from(err: ModelError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

impl CoreError {
    /// Classify a driver error raised while running `operation`.
    ///
    /// Unique and foreign-key violations surface as `Conflict` and
    /// `Validation` so the HTTP layer can answer 409/400 instead of 500.
    pub fn from_query(operation: &str, err: sqlx::Error) -> Self {
        if let Some(db_err) = err.as_database_error() {
            if db_err.is_unique_violation() {
                return CoreError::Conflict(format!(
                    "{operation}: {}",
                    db_err.message()
                ));
            }
            if db_err.is_foreign_key_violation() {
                return CoreError::Validation(format!(
                    "{operation}: referenced record does not exist"
                ));
            }
            if db_err.is_check_violation() {
                return CoreError::Validation(format!(
                    "{operation}: {}",
                    db_err.message()
                ));
            }
        }
        CoreError::Database(err)
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
