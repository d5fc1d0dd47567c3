// xihu_core/src/modules/bill.rs
use super::{LedgerTitle, OrderModule};
use crate::error::{LedgerError, LedgerResult};
use crate::model::{BillStatus, ModuleOrder, ModuleTransition, OrderType};
use crate::store::ModuleOrderStore;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillPaymentRequest {
  pub bill_id: i64,
}

/// A utility bill issued to a user. Bills are not created by checkout; paying one
/// links an existing bill to the ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentBill {
  pub id: i64,
  pub user_id: i64,
  pub bill_number: String,
  pub payment_type_name: String,
  pub bill_period: String,
  pub amount_cents: i64,
  pub due_date: NaiveDate,
  pub status: BillStatus,
  pub paid_time: Option<DateTime<Utc>>,
  pub unified_order_no: Option<String>,
  pub created_at: DateTime<Utc>,
}

impl PaymentBill {
  pub fn is_overdue(&self, today: NaiveDate) -> bool {
    self.status == BillStatus::Unpaid && self.due_date < today
  }
}

impl ModuleOrder for PaymentBill {
  const ORDER_TYPE: OrderType = OrderType::Payment;

  fn id(&self) -> i64 {
    self.id
  }

  fn assign_id(&mut self, id: i64) {
    self.id = id;
  }

  fn user_id(&self) -> i64 {
    self.user_id
  }

  fn total_amount_cents(&self) -> i64 {
    self.amount_cents
  }

  fn module_order_no(&self) -> Option<&str> {
    Some(&self.bill_number)
  }

  fn unified_order_no(&self) -> Option<&str> {
    self.unified_order_no.as_deref()
  }

  fn set_unified_order_no(&mut self, order_no: &str) {
    self.unified_order_no = Some(order_no.to_string());
  }

  fn apply_transition(&mut self, transition: ModuleTransition, at: DateTime<Utc>) -> bool {
    match (self.status, transition) {
      (BillStatus::Unpaid | BillStatus::Overdue, ModuleTransition::Confirm) => {
        self.status = BillStatus::Paid;
        self.paid_time = Some(at);
        true
      }
      _ => false,
    }
  }
}

/// Flips unpaid bills past their due date to overdue.
#[async_trait]
pub trait OverdueBills: Send + Sync {
  /// Returns how many bills changed.
  async fn mark_overdue(&self, today: NaiveDate) -> LedgerResult<u64>;
}

pub struct BillModule {
  store: Arc<dyn ModuleOrderStore<PaymentBill>>,
}

impl BillModule {
  pub fn new(store: Arc<dyn ModuleOrderStore<PaymentBill>>) -> Self {
    Self { store }
  }
}

#[async_trait]
impl OrderModule for BillModule {
  type Request = BillPaymentRequest;
  type Order = PaymentBill;

  fn store(&self) -> &Arc<dyn ModuleOrderStore<PaymentBill>> {
    &self.store
  }

  fn validate(&self, _user_id: i64, request: &BillPaymentRequest) -> LedgerResult<()> {
    if request.bill_id <= 0 {
      return Err(LedgerError::validation("bill id is required"));
    }
    Ok(())
  }

  async fn create(&self, user_id: i64, request: BillPaymentRequest) -> LedgerResult<PaymentBill> {
    let bill = self
      .store
      .find(request.bill_id)
      .await?
      .ok_or_else(|| LedgerError::not_found("bill", request.bill_id))?;
    if bill.status == BillStatus::Paid {
      return Err(LedgerError::validation("bill is already paid"));
    }
    if bill.user_id != user_id {
      return Err(LedgerError::forbidden("bill", request.bill_id));
    }
    Ok(bill)
  }

  fn ledger_title(&self, bill: &PaymentBill) -> LedgerTitle {
    LedgerTitle {
      title: format!("{} bill payment", bill.payment_type_name),
      description: format!("Utility payment - {} ({})", bill.payment_type_name, bill.bill_period),
    }
  }

  fn reuses_unpaid_ledger_entry(&self) -> bool {
    true
  }
}
