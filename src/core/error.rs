use thiserror::Error;
use tonic::Status;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("no updates provided")]
    EmptyPatch,

    #[error("no rows were affected")]
    NoRowsAffected,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Query error: {0}")]
    Query(String),
}

impl AppError {
    /// Text sent to the client. Driver errors and not-found messages go out
    /// unprefixed; the `Display` prefixes are for logs only.
    pub fn client_message(self) -> String {
        match self {
            AppError::Database(e) => e.to_string(),
            AppError::NotFound(msg) => msg,
            other => other.to_string(),
        }
    }
}

/// Every storage failure surfaces as `InvalidArgument`, clients do not get a
/// finer classification.
impl From<AppError> for Status {
    fn from(err: AppError) -> Self {
        Status::invalid_argument(err.client_message())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
