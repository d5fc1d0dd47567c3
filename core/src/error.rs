// xihu_core/src/error.rs
use crate::model::PaymentStatus;
use anyhow::Error as AnyhowError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
  #[error("Not logged in")]
  NotLoggedIn,

  #[error("{entity} not found: {key}")]
  NotFound { entity: &'static str, key: String },

  #[error("{entity} {key} does not belong to the current user")]
  Forbidden { entity: &'static str, key: String },

  #[error("Validation failed: {0}")]
  Validation(String),

  #[error("Cannot {action} order {order_no} while it is {status}")]
  InvalidTransition {
    order_no: String,
    action: &'static str,
    status: PaymentStatus,
  },

  /// An insert or update touched no rows.
  #[error("Persistence failure: {0}")]
  Persistence(String),

  #[error("Storage backend error. Source: {source}")]
  Storage {
    #[source]
    source: AnyhowError,
  },

  #[error("Handler missing for required workflow step: {step_name}")]
  MissingStepHandler { step_name: String },
}

impl LedgerError {
  pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
    LedgerError::NotFound {
      entity,
      key: key.to_string(),
    }
  }

  pub fn forbidden(entity: &'static str, key: impl ToString) -> Self {
    LedgerError::Forbidden {
      entity,
      key: key.to_string(),
    }
  }

  pub fn validation(message: impl Into<String>) -> Self {
    LedgerError::Validation(message.into())
  }

  /// Short machine-readable tag, used by the HTTP layer as the `code` field.
  pub fn code(&self) -> &'static str {
    match self {
      LedgerError::NotLoggedIn => "NOT_LOGIN",
      LedgerError::NotFound { .. } => "NOT_FOUND",
      LedgerError::Forbidden { .. } => "FORBIDDEN",
      LedgerError::Validation(_) => "VALIDATION",
      LedgerError::InvalidTransition { .. } => "INVALID_STATE",
      LedgerError::Persistence(_) | LedgerError::Storage { .. } => "PERSISTENCE",
      LedgerError::MissingStepHandler { .. } => "WORKFLOW",
    }
  }
}

// Storage adapters hand their driver errors over as anyhow::Error.
impl From<AnyhowError> for LedgerError {
  fn from(err: AnyhowError) -> Self {
    match err.downcast::<LedgerError>() {
      Ok(ledger_err) => ledger_err,
      Err(other) => LedgerError::Storage { source: other },
    }
  }
}

pub type LedgerResult<T, E = LedgerError> = std::result::Result<T, E>;
