//! Centralized error handling.
//!
//! Provides a unified error type for the entire application, with a
//! stable error code, a coarse category and a user-facing message that
//! the command line front end prints.

use sea_orm::{DbErr, RuntimeErr, SqlErr};
use thiserror::Error;

/// SQLite primary result codes for a lock held by another connection
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication & Authorization
    #[error("Sign in required")]
    Unauthorized,

    #[error("Access denied")]
    Forbidden,

    #[error("Invalid username or password")]
    InvalidCredentials,

    // Resource errors
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Product {0} not found")]
    ProductNotFound(i64),

    #[error("{0} already exists")]
    Conflict(String),

    // Stock
    #[error("Not enough stock for {product}: {available} available, {requested} requested")]
    InsufficientStock {
        product: String,
        available: i32,
        requested: i32,
    },

    #[error("Stock for product {0} changed while placing the order")]
    StockUpdateFailed(i64),

    // Validation
    #[error("{0}")]
    Validation(String),

    // External service errors
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("I/O error")]
    Io(#[from] std::io::Error),

    #[error("Export error")]
    Export(#[from] csv::Error),

    #[error("Serialization error")]
    Serialization(#[from] serde_json::Error),

    // Internal
    #[error("Internal error")]
    Internal(String),
}

/// Coarse error taxonomy used by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Auth,
    NotFound,
    Validation,
    Conflict,
    Internal,
}

impl AppError {
    /// Get error code
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Unauthorized => "UNAUTHORIZED",
            AppError::Forbidden => "FORBIDDEN",
            AppError::InvalidCredentials => "INVALID_CREDENTIALS",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::InsufficientStock { .. } => "INSUFFICIENT_STOCK",
            AppError::StockUpdateFailed(_) => "STOCK_UPDATE_FAILED",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Io(_) => "IO_ERROR",
            AppError::Export(_) => "EXPORT_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            AppError::Unauthorized | AppError::Forbidden | AppError::InvalidCredentials => {
                ErrorCategory::Auth
            }
            AppError::NotFound(_) | AppError::ProductNotFound(_) => ErrorCategory::NotFound,
            AppError::InsufficientStock { .. } | AppError::Validation(_) => {
                ErrorCategory::Validation
            }
            AppError::Conflict(_) | AppError::StockUpdateFailed(_) => ErrorCategory::Conflict,
            AppError::Database(_)
            | AppError::Io(_)
            | AppError::Export(_)
            | AppError::Serialization(_)
            | AppError::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Io(e) => {
                tracing::error!("I/O error: {:?}", e);
                "A file could not be read or written".to_string()
            }
            AppError::Export(e) => {
                tracing::error!("Export error: {:?}", e);
                "The spreadsheet could not be written".to_string()
            }
            AppError::Serialization(e) => {
                tracing::error!("Serialization error: {:?}", e);
                "Stored data could not be read".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            _ => self.to_string(),
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages: Vec<String> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| match &e.message {
                    Some(msg) => msg.to_string(),
                    None => format!("Invalid {}", field),
                })
            })
            .collect();
        messages.sort();
        AppError::Validation(messages.join("; "))
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: &'static str) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &'static str) -> AppResult<T> {
        self.ok_or(AppError::NotFound(entity))
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

/// Classification of database failures that callers recover from.
impl AppError {
    /// SQLite refused the statement because another connection holds the
    /// write lock (`SQLITE_BUSY` / `SQLITE_LOCKED`, extended codes included).
    pub fn is_lock_contention(&self) -> bool {
        let AppError::Database(
            DbErr::Conn(RuntimeErr::SqlxError(err))
            | DbErr::Exec(RuntimeErr::SqlxError(err))
            | DbErr::Query(RuntimeErr::SqlxError(err)),
        ) = self
        else {
            return false;
        };

        err.as_database_error()
            .and_then(|db_err| db_err.code())
            .and_then(|code| code.parse::<i32>().ok())
            .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
    }

    /// A UNIQUE index rejected the row.
    pub fn is_unique_violation(&self) -> bool {
        match self {
            AppError::Database(e) => {
                matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
            }
            _ => false,
        }
    }
}
