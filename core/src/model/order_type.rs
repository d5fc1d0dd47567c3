// xihu_core/src/model/order_type.rs
use crate::error::LedgerError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The business module an order belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
  Food,
  Hotel,
  Shopping,
  Travel,
  Payment,
}

impl OrderType {
  pub const ALL: [OrderType; 5] = [
    OrderType::Food,
    OrderType::Hotel,
    OrderType::Shopping,
    OrderType::Travel,
    OrderType::Payment,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      OrderType::Food => "FOOD",
      OrderType::Hotel => "HOTEL",
      OrderType::Shopping => "SHOPPING",
      OrderType::Travel => "TRAVEL",
      OrderType::Payment => "PAYMENT",
    }
  }

  /// Segment placed after `UO` in generated unified order numbers.
  pub fn order_no_prefix(&self) -> &'static str {
    match self {
      OrderType::Food => "FOOD",
      OrderType::Hotel => "HOTEL",
      OrderType::Shopping => "SHOP",
      OrderType::Travel => "TRAVEL",
      OrderType::Payment => "PAY",
    }
  }

  /// Whether the checkout page renders module line items for this type.
  pub fn shows_line_items(&self) -> bool {
    matches!(self, OrderType::Shopping | OrderType::Food | OrderType::Hotel)
  }
}

impl fmt::Display for OrderType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderType {
  type Err = LedgerError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    OrderType::ALL
      .into_iter()
      .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| LedgerError::validation(format!("unknown order type '{}'", s)))
  }
}
