//! Repository error handling
//!
//! Every error carries a short description of the attempted operation
//! (e.g. "creating comment") and renders as `"<operation>: <cause>"`, so
//! callers can classify failures without this layer normalizing store errors.

use thiserror::Error;
use uuid::Uuid;

/// Error returned by every repository operation
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("{context}: record not found")]
    NotFound { context: &'static str },

    #[error("{context}: step num out of range")]
    StepOutOfRange {
        context: &'static str,
        requested: i32,
        max: i32,
    },

    #[error("{context}: step {step_id} does not belong to recipe {recipe_id}")]
    StepRecipeMismatch {
        context: &'static str,
        step_id: Uuid,
        recipe_id: Uuid,
    },

    #[error("{context}: {message}")]
    Validation {
        context: &'static str,
        message: String,
    },

    #[error("{context}: {source}")]
    Database {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },

    #[error("{rollback}: {source}")]
    Transaction {
        #[source]
        source: Box<RepositoryError>,
        rollback: sqlx::Error,
    },
}

impl RepositoryError {
    pub fn database(context: &'static str, source: sqlx::Error) -> Self {
        Self::Database { context, source }
    }

    pub fn validation(context: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            context,
            message: message.into(),
        }
    }

    /// Merge a failed rollback into the error that triggered it
    pub fn with_rollback(self, rollback: sqlx::Error) -> Self {
        Self::Transaction {
            source: Box::new(self),
            rollback,
        }
    }

    /// The lookup matched no rows
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Transaction { source, .. } => source.is_not_found(),
            _ => false,
        }
    }

    /// A unique constraint (login, email, comment per author...) was violated
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self.database_error_kind(),
            Some(sqlx::error::ErrorKind::UniqueViolation)
        )
    }

    /// A referenced row (recipe, salad, user...) does not exist
    pub fn is_foreign_key_violation(&self) -> bool {
        matches!(
            self.database_error_kind(),
            Some(sqlx::error::ErrorKind::ForeignKeyViolation)
        )
    }

    fn database_error_kind(&self) -> Option<sqlx::error::ErrorKind> {
        match self {
            Self::Database { source, .. } => source.as_database_error().map(|e| e.kind()),
            Self::Transaction { source, .. } => source.database_error_kind(),
            _ => None,
        }
    }
}

/// Result type alias for repository operations
pub type RepositoryResult<T> = Result<T, RepositoryError>;

/// Attach an operation description to a store result
pub trait DbResultExt<T> {
    /// `RowNotFound` becomes [`RepositoryError::NotFound`], anything else
    /// [`RepositoryError::Database`]
    fn context(self, context: &'static str) -> RepositoryResult<T>;
}

impl<T> DbResultExt<T> for Result<T, sqlx::Error> {
    fn context(self, context: &'static str) -> RepositoryResult<T> {
        self.map_err(|source| match source {
            sqlx::Error::RowNotFound => RepositoryError::NotFound { context },
            source => RepositoryError::Database { context, source },
        })
    }
}
