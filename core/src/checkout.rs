// xihu_core/src/checkout.rs

//! Ledger-side operations the checkout pages call: view, pay, cancel, delete,
//! list and count. Every operation is scoped to the calling user.

use crate::error::{LedgerError, LedgerResult};
use crate::linkage::{create_ledger_entry, LedgerEntryRequest};
use crate::model::{LedgerFilter, LineItems, OrderStats, OrderType, UnifiedOrder};
use crate::modules::ModuleRegistry;
use crate::store::LedgerStore;
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// What the checkout page renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutView {
  pub order: UnifiedOrder,
  /// Set only when `order_details` is.
  pub detail_type: Option<OrderType>,
  pub order_details: Option<LineItems>,
}

/// A ledger row created directly, with no module order behind it.
#[derive(Debug, Clone, PartialEq)]
pub struct StandaloneOrder {
  pub order_type: OrderType,
  pub title: String,
  pub description: String,
  pub total_amount_cents: i64,
}

#[derive(Clone)]
pub struct CheckoutService {
  ledger: Arc<dyn LedgerStore>,
  modules: ModuleRegistry,
}

impl CheckoutService {
  pub fn new(ledger: Arc<dyn LedgerStore>, modules: ModuleRegistry) -> Self {
    Self { ledger, modules }
  }

  /// Loads the order and checks the caller owns it.
  async fn owned_order(&self, order_no: &str, user_id: i64) -> LedgerResult<UnifiedOrder> {
    let order = self
      .ledger
      .find_by_order_no(order_no)
      .await?
      .ok_or_else(|| LedgerError::not_found("order", order_no))?;
    if !order.is_owned_by(user_id) {
      return Err(LedgerError::forbidden("order", order_no));
    }
    Ok(order)
  }

  #[instrument(name = "CheckoutService::checkout", skip(self))]
  pub async fn checkout(&self, order_no: &str, user_id: i64) -> LedgerResult<CheckoutView> {
    let order = self.owned_order(order_no, user_id).await?;

    let order_details = match order.module_ref {
      Some(module_ref) if order.order_type.shows_line_items() => {
        self
          .modules
          .verified_line_items(module_ref, user_id, &order.order_no)
          .await?
      }
      _ => None,
    };
    let detail_type = order_details.as_ref().map(|_| order.order_type);

    Ok(CheckoutView {
      order,
      detail_type,
      order_details,
    })
  }

  /// `Unpaid -> Paid`, then marks the module order paid.
  ///
  /// The ledger update is guarded on `Unpaid`, so a repeated call fails with
  /// `InvalidTransition` instead of touching the row again.
  #[instrument(name = "CheckoutService::process_payment", skip(self))]
  pub async fn process_payment(&self, order_no: &str, user_id: i64, payment_method: &str) -> LedgerResult<()> {
    let payment_method = payment_method.trim();
    if payment_method.is_empty() {
      return Err(LedgerError::validation("payment method is required"));
    }
    let order = self.owned_order(order_no, user_id).await?;
    if !order.payment_status.can_pay() {
      return Err(LedgerError::InvalidTransition {
        order_no: order.order_no,
        action: "pay",
        status: order.payment_status,
      });
    }

    if !self.ledger.mark_paid(order_no, payment_method, Utc::now()).await? {
      // Lost a race with another pay or cancel.
      return Err(self.transition_conflict(order_no, "pay").await);
    }
    info!(payment_method, "Order paid.");

    if let Some(module_ref) = order.module_ref {
      match self.modules.confirm(module_ref).await {
        Ok(true) => {}
        Ok(false) => warn!(?module_ref, "Module order not updated after payment."),
        Err(e) => warn!(?module_ref, error = %e, "Module sync after payment failed."),
      }
    }
    Ok(())
  }

  /// `Unpaid -> Cancelled`, then cancels the module order (bills excepted).
  #[instrument(name = "CheckoutService::cancel_order", skip(self))]
  pub async fn cancel_order(&self, order_no: &str, user_id: i64) -> LedgerResult<()> {
    let order = self.owned_order(order_no, user_id).await?;
    if !self.ledger.cancel(order_no).await? {
      return Err(self.transition_conflict(order_no, "cancel").await);
    }
    info!("Order cancelled.");

    if let Some(module_ref) = order.module_ref {
      if module_ref.order_type() != OrderType::Payment {
        match self.modules.cancel(module_ref).await {
          Ok(true) => {}
          Ok(false) => warn!(?module_ref, "Module order not updated after cancel."),
          Err(e) => warn!(?module_ref, error = %e, "Module sync after cancel failed."),
        }
      }
    }
    Ok(())
  }

  /// Removes a cancelled order.
  #[instrument(name = "CheckoutService::delete_order", skip(self))]
  pub async fn delete_order(&self, order_no: &str, user_id: i64) -> LedgerResult<()> {
    let order = self.owned_order(order_no, user_id).await?;
    if !order.payment_status.can_delete() {
      return Err(LedgerError::InvalidTransition {
        order_no: order.order_no,
        action: "delete",
        status: order.payment_status,
      });
    }
    if !self.ledger.delete_cancelled(order_no, user_id).await? {
      return Err(self.transition_conflict(order_no, "delete").await);
    }
    info!("Order deleted.");
    Ok(())
  }

  #[instrument(name = "CheckoutService::list_orders", skip(self))]
  pub async fn list_orders(&self, user_id: i64, filter: LedgerFilter) -> LedgerResult<Vec<UnifiedOrder>> {
    self.ledger.list_for_user(user_id, &filter).await
  }

  pub async fn order_stats(&self, user_id: i64) -> LedgerResult<OrderStats> {
    self.ledger.stats_for_user(user_id).await
  }

  #[instrument(name = "CheckoutService::create_standalone_order", skip(self, order), fields(order_type = %order.order_type))]
  pub async fn create_standalone_order(&self, user_id: i64, order: StandaloneOrder) -> LedgerResult<UnifiedOrder> {
    create_ledger_entry(
      self.ledger.as_ref(),
      LedgerEntryRequest {
        user_id,
        order_type: order.order_type,
        module_ref: None,
        title: order.title,
        description: order.description,
        total_amount_cents: order.total_amount_cents,
      },
    )
    .await
  }

  /// Explains why a guarded update touched nothing, by re-reading the row.
  async fn transition_conflict(&self, order_no: &str, action: &'static str) -> LedgerError {
    match self.ledger.find_by_order_no(order_no).await {
      Ok(Some(current)) => LedgerError::InvalidTransition {
        order_no: order_no.to_string(),
        action,
        status: current.payment_status,
      },
      Ok(None) => LedgerError::not_found("order", order_no),
      Err(e) => e,
    }
  }
}

