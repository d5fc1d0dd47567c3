// xihu_core/src/linkage.rs

//! The two halves of linking a module order to the ledger: inserting the ledger
//! row, then writing its number back onto the module order. The halves are not
//! atomic. A failed back-link leaves an `Unpaid` ledger row with no module row
//! pointing at it.

use crate::error::{LedgerError, LedgerResult};
use crate::model::{ModuleOrderRef, NewLedgerEntry, OrderType, UnifiedOrder};
use crate::modules::OrderModule;
use crate::store::LedgerStore;
use chrono::{DateTime, Utc};
use rand_core::{OsRng, RngCore};
use tracing::{debug, error, info, instrument, warn};

/// Input for a new ledger row.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntryRequest {
  pub user_id: i64,
  pub order_type: OrderType,
  pub module_ref: Option<ModuleOrderRef>,
  pub title: String,
  pub description: String,
  pub total_amount_cents: i64,
}

/// `UO` + type prefix + 13-digit epoch millis + 3-digit suffix.
pub fn format_order_no(order_type: OrderType, epoch_millis: i64, suffix: u32) -> String {
  format!(
    "UO{}{:013}{:03}",
    order_type.order_no_prefix(),
    epoch_millis,
    suffix % 1000
  )
}

/// A fresh unified order number. Collisions are possible within one millisecond;
/// the store's unique index turns one into a `Persistence` error, which
/// `create_ledger_entry` retries once.
pub fn generate_order_no(order_type: OrderType, now: DateTime<Utc>) -> String {
  format_order_no(order_type, now.timestamp_millis(), OsRng.next_u32())
}

/// A module's own order number: `prefix` + `yyyyMMddHHmmss` + 4 random digits.
pub fn generate_module_order_no(prefix: &str, now: DateTime<Utc>) -> String {
  format!(
    "{}{}{:04}",
    prefix,
    now.format("%Y%m%d%H%M%S"),
    OsRng.next_u32() % 10_000
  )
}

/// Inserts an `Unpaid` ledger row and returns it.
#[instrument(
  name = "linkage::create_ledger_entry",
  skip(ledger, request),
  fields(user_id = request.user_id, order_type = %request.order_type),
  err(Display)
)]
pub async fn create_ledger_entry(ledger: &dyn LedgerStore, request: LedgerEntryRequest) -> LedgerResult<UnifiedOrder> {
  if let Some(module_ref) = request.module_ref {
    if module_ref.order_type() != request.order_type {
      return Err(LedgerError::validation(format!(
        "module reference {:?} does not match order type {}",
        module_ref, request.order_type
      )));
    }
  }
  if request.total_amount_cents < 0 {
    return Err(LedgerError::validation("order amount must not be negative"));
  }
  if request.title.trim().is_empty() {
    return Err(LedgerError::validation("order title is required"));
  }

  let entry = NewLedgerEntry {
    order_no: generate_order_no(request.order_type, Utc::now()),
    user_id: request.user_id,
    order_type: request.order_type,
    module_ref: request.module_ref,
    title: request.title,
    description: request.description,
    total_amount_cents: request.total_amount_cents,
  };
  debug!(order_no = %entry.order_no, "Inserting ledger row.");
  let order = match ledger.insert(entry.clone()).await {
    Ok(order) => order,
    // One retry with a fresh number covers a same-millisecond suffix clash.
    Err(LedgerError::Persistence(reason)) => {
      warn!(order_no = %entry.order_no, %reason, "Ledger insert failed; retrying with a new order number.");
      let retry = NewLedgerEntry {
        order_no: generate_order_no(entry.order_type, Utc::now()),
        ..entry
      };
      ledger.insert(retry).await?
    }
    Err(e) => return Err(e),
  };

  info!(order_no = %order.order_no, amount_cents = order.total_amount_cents, "Ledger row created.");
  Ok(order)
}

/// Writes `order_no` onto the module order. Never fails: problems are logged and
/// reported as `false`, and the ledger row stays in place.
#[instrument(name = "linkage::back_link_module_order", skip(module), fields(order_type = %module.order_type()))]
pub async fn back_link_module_order<M>(module: &M, module_order_id: i64, order_no: &str) -> bool
where
  M: OrderModule,
{
  match module.back_link(module_order_id, order_no).await {
    Ok(true) => true,
    Ok(false) => {
      error!("Back-link touched no module order; ledger row is orphaned.");
      false
    }
    Err(e) => {
      error!(error = %e, "Back-link failed; ledger row is orphaned.");
      false
    }
  }
}
