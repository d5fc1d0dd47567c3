// xihu_core/src/modules/travel.rs
use super::{LedgerTitle, OrderModule};
use crate::error::{LedgerError, LedgerResult};
use crate::linkage::generate_module_order_no;
use crate::model::{ModuleOrder, ModuleStatus, ModuleTransition, OrderType};
use crate::store::ModuleOrderStore;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketBooking {
  pub attraction_id: i64,
  pub attraction_name: String,
  pub visit_date: NaiveDate,
  pub ticket_count: i32,
  pub ticket_price_cents: i64,
  #[serde(default)]
  pub contact_name: Option<String>,
  #[serde(default)]
  pub contact_phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelOrder {
  pub id: i64,
  pub order_no: String,
  pub unified_order_no: Option<String>,
  pub user_id: i64,
  pub attraction_id: i64,
  pub attraction_name: String,
  pub visit_date: NaiveDate,
  pub ticket_count: i32,
  pub ticket_price_cents: i64,
  pub total_amount_cents: i64,
  pub contact_name: Option<String>,
  pub contact_phone: Option<String>,
  pub status: ModuleStatus,
  pub payment_time: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
}

impl ModuleOrder for TravelOrder {
  const ORDER_TYPE: OrderType = OrderType::Travel;

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
    self.total_amount_cents
  }

  fn module_order_no(&self) -> Option<&str> {
    Some(&self.order_no)
  }

  fn unified_order_no(&self) -> Option<&str> {
    self.unified_order_no.as_deref()
  }

  fn set_unified_order_no(&mut self, order_no: &str) {
    self.unified_order_no = Some(order_no.to_string());
  }

  fn apply_transition(&mut self, transition: ModuleTransition, at: DateTime<Utc>) -> bool {
    let Some(next) = self.status.after(transition) else {
      return false;
    };
    if next == ModuleStatus::Paid {
      self.payment_time = Some(at);
    }
    self.status = next;
    true
  }
}

pub struct TravelModule {
  store: Arc<dyn ModuleOrderStore<TravelOrder>>,
}

impl TravelModule {
  pub fn new(store: Arc<dyn ModuleOrderStore<TravelOrder>>) -> Self {
    Self { store }
  }
}

#[async_trait]
impl OrderModule for TravelModule {
  type Request = TicketBooking;
  type Order = TravelOrder;

  fn store(&self) -> &Arc<dyn ModuleOrderStore<TravelOrder>> {
    &self.store
  }

  fn validate(&self, _user_id: i64, booking: &TicketBooking) -> LedgerResult<()> {
    if booking.attraction_name.trim().is_empty() {
      return Err(LedgerError::validation("attraction name is required"));
    }
    if booking.ticket_count < 1 {
      return Err(LedgerError::validation("at least one ticket is required"));
    }
    if booking.ticket_price_cents < 0 {
      return Err(LedgerError::validation("ticket price must not be negative"));
    }
    Ok(())
  }

  async fn create(&self, user_id: i64, booking: TicketBooking) -> LedgerResult<TravelOrder> {
    let total = booking
      .ticket_price_cents
      .checked_mul(i64::from(booking.ticket_count))
      .ok_or_else(|| LedgerError::validation("order total overflows"))?;
    let now = Utc::now();
    let order = TravelOrder {
      id: 0,
      order_no: generate_module_order_no("TRAVEL", now),
      unified_order_no: None,
      user_id,
      attraction_id: booking.attraction_id,
      attraction_name: booking.attraction_name,
      visit_date: booking.visit_date,
      ticket_count: booking.ticket_count,
      ticket_price_cents: booking.ticket_price_cents,
      total_amount_cents: total,
      contact_name: booking.contact_name,
      contact_phone: booking.contact_phone,
      status: ModuleStatus::Pending,
      payment_time: None,
      created_at: now,
    };
    self.store.insert(order).await
  }

  fn ledger_title(&self, order: &TravelOrder) -> LedgerTitle {
    LedgerTitle {
      title: format!("{} tickets", order.attraction_name),
      description: format!("{} ticket(s) for {}", order.ticket_count, order.visit_date),
    }
  }
}
