// xihu_core/src/model/status.rs

//! Status codes. Each enum serializes as its integer code, which is also what the
//! database columns store.

use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Payment status of a unified ledger row.
///
/// Legal moves: `Unpaid -> Paid`, `Unpaid -> Cancelled`. Nothing leaves `Paid`
/// or `Cancelled` through the ledger API; `Completed` is only ever read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum PaymentStatus {
  Unpaid,
  Paid,
  Cancelled,
  Completed,
}

impl PaymentStatus {
  pub fn code(self) -> i16 {
    match self {
      PaymentStatus::Unpaid => 0,
      PaymentStatus::Paid => 1,
      PaymentStatus::Cancelled => 2,
      PaymentStatus::Completed => 3,
    }
  }

  pub fn from_code(code: i16) -> Result<Self, LedgerError> {
    match code {
      0 => Ok(PaymentStatus::Unpaid),
      1 => Ok(PaymentStatus::Paid),
      2 => Ok(PaymentStatus::Cancelled),
      3 => Ok(PaymentStatus::Completed),
      other => Err(LedgerError::validation(format!("unknown payment status {}", other))),
    }
  }

  pub fn can_pay(self) -> bool {
    self == PaymentStatus::Unpaid
  }

  pub fn can_cancel(self) -> bool {
    self == PaymentStatus::Unpaid
  }

  pub fn can_delete(self) -> bool {
    self == PaymentStatus::Cancelled
  }

  pub fn label(self) -> &'static str {
    match self {
      PaymentStatus::Unpaid => "unpaid",
      PaymentStatus::Paid => "paid",
      PaymentStatus::Cancelled => "cancelled",
      PaymentStatus::Completed => "completed",
    }
  }
}

impl fmt::Display for PaymentStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.label())
  }
}

impl From<PaymentStatus> for i16 {
  fn from(status: PaymentStatus) -> Self {
    status.code()
  }
}

impl TryFrom<i16> for PaymentStatus {
  type Error = LedgerError;

  fn try_from(code: i16) -> Result<Self, Self::Error> {
    PaymentStatus::from_code(code)
  }
}

/// Parses the numeric code, e.g. `"1"` for `Paid`.
impl FromStr for PaymentStatus {
  type Err = LedgerError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let code = s
      .trim()
      .parse::<i16>()
      .map_err(|_| LedgerError::validation(format!("invalid payment status '{}'", s)))?;
    PaymentStatus::from_code(code)
  }
}

/// Status of a hotel, food, shop or travel order: 0 pending, 1 paid/confirmed,
/// 2 cancelled, 3 completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum ModuleStatus {
  Pending,
  Paid,
  Cancelled,
  Completed,
}

impl ModuleStatus {
  pub fn code(self) -> i16 {
    match self {
      ModuleStatus::Pending => 0,
      ModuleStatus::Paid => 1,
      ModuleStatus::Cancelled => 2,
      ModuleStatus::Completed => 3,
    }
  }

  pub fn from_code(code: i16) -> Result<Self, LedgerError> {
    match code {
      0 => Ok(ModuleStatus::Pending),
      1 => Ok(ModuleStatus::Paid),
      2 => Ok(ModuleStatus::Cancelled),
      3 => Ok(ModuleStatus::Completed),
      other => Err(LedgerError::validation(format!("unknown module order status {}", other))),
    }
  }

  /// Status after `transition`, or `None` when the move is not allowed.
  pub fn after(self, transition: ModuleTransition) -> Option<ModuleStatus> {
    match (self, transition) {
      (ModuleStatus::Pending, ModuleTransition::Confirm) => Some(ModuleStatus::Paid),
      (ModuleStatus::Pending, ModuleTransition::Cancel) => Some(ModuleStatus::Cancelled),
      _ => None,
    }
  }
}

impl From<ModuleStatus> for i16 {
  fn from(status: ModuleStatus) -> Self {
    status.code()
  }
}

impl TryFrom<i16> for ModuleStatus {
  type Error = LedgerError;

  fn try_from(code: i16) -> Result<Self, Self::Error> {
    ModuleStatus::from_code(code)
  }
}

/// Status of a utility bill: 0 unpaid, 1 paid, 2 overdue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i16", try_from = "i16")]
pub enum BillStatus {
  Unpaid,
  Paid,
  Overdue,
}

impl BillStatus {
  pub fn code(self) -> i16 {
    match self {
      BillStatus::Unpaid => 0,
      BillStatus::Paid => 1,
      BillStatus::Overdue => 2,
    }
  }

  pub fn from_code(code: i16) -> Result<Self, LedgerError> {
    match code {
      0 => Ok(BillStatus::Unpaid),
      1 => Ok(BillStatus::Paid),
      2 => Ok(BillStatus::Overdue),
      other => Err(LedgerError::validation(format!("unknown bill status {}", other))),
    }
  }
}

impl From<BillStatus> for i16 {
  fn from(status: BillStatus) -> Self {
    status.code()
  }
}

impl TryFrom<i16> for BillStatus {
  type Error = LedgerError;

  fn try_from(code: i16) -> Result<Self, Self::Error> {
    BillStatus::from_code(code)
  }
}

/// A status change pushed from the ledger down to a module order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleTransition {
  /// Payment went through: the module order becomes paid (hotel: confirmed).
  Confirm,
  Cancel,
}
