// xihu_core/src/model/unified_order.rs
use super::{ModuleOrderRef, OrderType, PaymentStatus};
use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// One row of the unified ledger. Amounts are in cents.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedOrder {
  pub id: i64,
  pub order_no: String,
  pub user_id: i64,
  pub order_type: OrderType,
  #[serde(rename = "moduleOrderId", serialize_with = "serialize_module_id")]
  pub module_ref: Option<ModuleOrderRef>,
  pub title: String,
  pub description: String,
  pub total_amount_cents: i64,
  pub payment_status: PaymentStatus,
  pub payment_method: Option<String>,
  pub payment_time: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl UnifiedOrder {
  pub fn is_owned_by(&self, user_id: i64) -> bool {
    self.user_id == user_id
  }

  pub fn module_order_id(&self) -> Option<i64> {
    self.module_ref.map(|r| r.id())
  }
}

fn serialize_module_id<S: serde::Serializer>(
  module_ref: &Option<ModuleOrderRef>,
  serializer: S,
) -> Result<S::Ok, S::Error> {
  module_ref.map(|r| r.id()).serialize(serializer)
}

/// Everything a store needs to insert a ledger row. The store assigns `id` and
/// timestamps; the row always starts `Unpaid`.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLedgerEntry {
  pub order_no: String,
  pub user_id: i64,
  pub order_type: OrderType,
  pub module_ref: Option<ModuleOrderRef>,
  pub title: String,
  pub description: String,
  pub total_amount_cents: i64,
}

/// Optional list filters; `None` means "any".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerFilter {
  #[serde(default, deserialize_with = "blank_as_any")]
  pub order_type: Option<OrderType>,
  #[serde(default, deserialize_with = "blank_as_any")]
  pub payment_status: Option<PaymentStatus>,
}

// Query strings carry every value as text; JSON bodies may send the status as a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum FilterValue {
  Code(i64),
  Text(String),
}

/// An absent or blank filter value means "any".
fn blank_as_any<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
  D: Deserializer<'de>,
  T: FromStr,
  T::Err: fmt::Display,
{
  let text = match Option::<FilterValue>::deserialize(deserializer)? {
    None => return Ok(None),
    Some(FilterValue::Code(code)) => code.to_string(),
    Some(FilterValue::Text(text)) => text,
  };
  if text.trim().is_empty() {
    return Ok(None);
  }
  text.trim().parse::<T>().map(Some).map_err(de::Error::custom)
}

impl LedgerFilter {
  pub fn matches(&self, order: &UnifiedOrder) -> bool {
    self.order_type.map_or(true, |t| t == order.order_type)
      && self.payment_status.map_or(true, |s| s == order.payment_status)
  }
}

/// Per-user counts by payment status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
  pub total: i64,
  pub unpaid: i64,
  pub paid: i64,
  pub cancelled: i64,
  pub completed: i64,
}

impl OrderStats {
  pub fn tally<'a>(orders: impl IntoIterator<Item = &'a UnifiedOrder>) -> Self {
    orders.into_iter().fold(OrderStats::default(), |mut stats, order| {
      stats.total += 1;
      match order.payment_status {
        PaymentStatus::Unpaid => stats.unpaid += 1,
        PaymentStatus::Paid => stats.paid += 1,
        PaymentStatus::Cancelled => stats.cancelled += 1,
        PaymentStatus::Completed => stats.completed += 1,
      }
      stats
    })
  }
}
