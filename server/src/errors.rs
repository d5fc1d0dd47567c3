// server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;
use xihu_core::LedgerError;

#[derive(Debug, Error)]
pub enum AppError {
  #[error(transparent)]
  Ledger(#[from] LedgerError),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  fn code(&self) -> &'static str {
    match self {
      AppError::Ledger(e) => e.code(),
      AppError::Sqlx(_) => "PERSISTENCE",
      AppError::Auth(_) => "AUTH_FAILED",
      AppError::Config(_) => "CONFIG",
      AppError::Validation(_) => "VALIDATION",
      AppError::Internal(_) => "INTERNAL",
    }
  }

  /// Message safe to show the client. Storage details stay in the logs.
  fn client_message(&self) -> String {
    match self {
      AppError::Ledger(LedgerError::NotLoggedIn) => "Please log in first".to_string(),
      AppError::Ledger(LedgerError::Storage { .. } | LedgerError::Persistence(_)) | AppError::Sqlx(_) => {
        "Database operation failed".to_string()
      }
      AppError::Ledger(LedgerError::MissingStepHandler { .. }) => {
        "Order workflow is misconfigured".to_string()
      }
      AppError::Ledger(e) => e.to_string(),
      AppError::Auth(m) | AppError::Validation(m) => m.clone(),
      AppError::Config(_) => "Configuration issue".to_string(),
      AppError::Internal(_) => "An internal error occurred".to_string(),
    }
  }
}

// Handlers may use `?` on anyhow-returning helpers.
impl From<anyhow::Error> for AppError {
  fn from(err: anyhow::Error) -> Self {
    match err.downcast::<sqlx::Error>() {
      Ok(sqlx_err) => AppError::Sqlx(sqlx_err),
      Err(other) => AppError::Internal(other.to_string()),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Ledger(e) => match e {
        LedgerError::NotLoggedIn => StatusCode::UNAUTHORIZED,
        LedgerError::NotFound { .. } => StatusCode::NOT_FOUND,
        LedgerError::Forbidden { .. } => StatusCode::FORBIDDEN,
        LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
        LedgerError::InvalidTransition { .. } => StatusCode::CONFLICT,
        LedgerError::Persistence(_)
        | LedgerError::Storage { .. }
        | LedgerError::MissingStepHandler { .. } => StatusCode::INTERNAL_SERVER_ERROR,
      },
      AppError::Validation(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Sqlx(_) | AppError::Config(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    if status.is_server_error() {
      tracing::error!(application_error = %self, "Responding with error");
    } else {
      tracing::warn!(application_error = %self, "Responding with error");
    }
    HttpResponse::build(status).json(json!({
      "success": false,
      "code": self.code(),
      "message": self.client_message(),
    }))
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
