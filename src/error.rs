use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CibilError {
    #[error("{resource} not found")]
    NotFound { resource: &'static str, key: String },

    #[error("{message}")]
    Validation {
        message: String,
        details: Option<String>,
    },

    #[error("{0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(SqlxError),

    #[error("Score ledger error: {0}")]
    Ledger(String),
}

impl CibilError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: None,
        }
    }

    pub fn validation_with(message: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            details: Some(details.into()),
        }
    }

    pub fn customer_not_found(pan: impl Into<String>) -> Self {
        Self::NotFound {
            resource: "Customer",
            key: pan.into(),
        }
    }

    /// True for storage and ledger failures, as opposed to a bad request or a
    /// missing record.
    pub fn is_internal(&self) -> bool {
        matches!(self, CibilError::Database(_) | CibilError::Ledger(_))
    }
}

impl From<SqlxError> for CibilError {
    fn from(e: SqlxError) -> Self {
        match &e {
            SqlxError::RowNotFound => CibilError::NotFound {
                resource: "Record",
                key: String::new(),
            },
            SqlxError::Database(db) if db.is_unique_violation() => {
                CibilError::Conflict(unique_violation_message(db.message()))
            }
            SqlxError::Database(db) if db.is_foreign_key_violation() => {
                CibilError::validation_with("Referenced record does not exist", db.message())
            }
            _ => CibilError::Database(e),
        }
    }
}

/// SQLite reports `UNIQUE constraint failed: customers.pan_card_number`.
fn unique_violation_message(raw: &str) -> String {
    if raw.contains("customers.pan_card_number") {
        "customer with this pan card number already exists.".to_string()
    } else if raw.contains("bank_accounts.account_number") {
        "The fields account_number, ifsc_code must make a unique set.".to_string()
    } else {
        format!("Duplicate record: {raw}")
    }
}

impl IntoResponse for CibilError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            CibilError::NotFound { resource, .. } => (
                StatusCode::NOT_FOUND,
                ApiErrorBody {
                    error: format!("{resource} not found"),
                    code: "NOT_FOUND",
                    details: None,
                },
            ),
            CibilError::Validation { message, details } => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    error: message,
                    code: "VALIDATION_ERROR",
                    details,
                },
            ),
            CibilError::Conflict(message) => (
                StatusCode::BAD_REQUEST,
                ApiErrorBody {
                    error: message,
                    code: "CONFLICT",
                    details: None,
                },
            ),
            CibilError::Database(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    error: "An internal server error occurred.".to_string(),
                    code: "INTERNAL_ERROR",
                    details: None,
                },
            ),
            CibilError::Ledger(details) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ApiErrorBody {
                    error: "An internal server error occurred.".to_string(),
                    code: "INTERNAL_ERROR",
                    details: Some(details),
                },
            ),
        };
        (status, Json(body)).into_response()
    }
}

/// Standardized API error response body
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Error body for failures of a compound operation, where `error` names the
/// operation and `details` carries the underlying cause.
pub fn operation_failed(
    status: StatusCode,
    operation: &str,
    cause: &CibilError,
) -> axum::response::Response {
    let body = ApiErrorBody {
        error: operation.to_string(),
        code: if status.is_server_error() {
            "INTERNAL_ERROR"
        } else {
            "OPERATION_FAILED"
        },
        details: Some(cause.to_string()),
    };
    (status, Json(body)).into_response()
}
