// xihu_core/src/modules/hotel.rs
use super::{LedgerTitle, OrderModule};
use crate::error::{LedgerError, LedgerResult};
use crate::linkage::generate_module_order_no;
use crate::model::{HotelStayDetail, LineItems, ModuleOrder, ModuleStatus, ModuleTransition, OrderType};
use crate::store::ModuleOrderStore;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_HOTEL_NAME: &str = "Hotel";

/// Nights between check-in and check-out, never less than one.
pub fn stay_nights(check_in: NaiveDate, check_out: NaiveDate) -> i64 {
  (check_out - check_in).num_days().max(1)
}

/// Total price spread evenly over the nights (integer cents, truncated).
pub fn per_night_cents(total_cents: i64, nights: i64) -> i64 {
  total_cents / nights.max(1)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelBooking {
  pub hotel_id: i64,
  pub hotel_name: Option<String>,
  pub room_id: i64,
  pub room_name: String,
  pub check_in: NaiveDate,
  pub check_out: NaiveDate,
  pub guests: i32,
  pub contact_name: String,
  pub contact_phone: String,
  #[serde(default)]
  pub notes: Option<String>,
  pub total_price_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelOrder {
  pub id: i64,
  pub order_no: String,
  pub unified_order_no: Option<String>,
  pub user_id: i64,
  pub hotel_id: i64,
  pub room_id: i64,
  pub room_name: String,
  pub check_in: NaiveDate,
  pub check_out: NaiveDate,
  pub guests: i32,
  pub contact_name: String,
  pub contact_phone: String,
  pub notes: Option<String>,
  pub total_price_cents: i64,
  pub status: ModuleStatus,
  pub created_at: DateTime<Utc>,
  pub stay: HotelStayDetail,
}

impl ModuleOrder for HotelOrder {
  const ORDER_TYPE: OrderType = OrderType::Hotel;

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
    self.total_price_cents
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

  fn apply_transition(&mut self, transition: ModuleTransition, _at: DateTime<Utc>) -> bool {
    match self.status.after(transition) {
      Some(next) => {
        self.status = next;
        true
      }
      None => false,
    }
  }

  fn line_items(&self) -> Option<LineItems> {
    Some(LineItems::Hotel(vec![self.stay.clone()]))
  }
}

pub struct HotelModule {
  store: Arc<dyn ModuleOrderStore<HotelOrder>>,
}

impl HotelModule {
  pub fn new(store: Arc<dyn ModuleOrderStore<HotelOrder>>) -> Self {
    Self { store }
  }
}

#[async_trait]
impl OrderModule for HotelModule {
  type Request = HotelBooking;
  type Order = HotelOrder;

  fn store(&self) -> &Arc<dyn ModuleOrderStore<HotelOrder>> {
    &self.store
  }

  fn validate(&self, _user_id: i64, booking: &HotelBooking) -> LedgerResult<()> {
    if booking.room_name.trim().is_empty() {
      return Err(LedgerError::validation("room name is required"));
    }
    if booking.guests < 1 {
      return Err(LedgerError::validation("at least one guest is required"));
    }
    if booking.total_price_cents <= 0 {
      return Err(LedgerError::validation("booking price must be positive"));
    }
    if booking.contact_name.trim().is_empty() || booking.contact_phone.trim().is_empty() {
      return Err(LedgerError::validation("contact name and phone are required"));
    }
    Ok(())
  }

  async fn create(&self, user_id: i64, booking: HotelBooking) -> LedgerResult<HotelOrder> {
    let now = Utc::now();
    let order_no = generate_module_order_no("HOTEL", now);
    let nights = stay_nights(booking.check_in, booking.check_out);
    let hotel_name = booking
      .hotel_name
      .filter(|n| !n.trim().is_empty())
      .unwrap_or_else(|| DEFAULT_HOTEL_NAME.to_string());

    let stay = HotelStayDetail {
      order_no: order_no.clone(),
      hotel_id: booking.hotel_id,
      hotel_name,
      room_type: booking.room_name.clone(),
      check_in: booking.check_in,
      check_out: booking.check_out,
      nights,
      guests: booking.guests,
      room_price_cents: per_night_cents(booking.total_price_cents, nights),
      subtotal_cents: booking.total_price_cents,
    };

    let order = HotelOrder {
      id: 0,
      order_no,
      unified_order_no: None,
      user_id,
      hotel_id: booking.hotel_id,
      room_id: booking.room_id,
      room_name: booking.room_name,
      check_in: booking.check_in,
      check_out: booking.check_out,
      guests: booking.guests,
      contact_name: booking.contact_name,
      contact_phone: booking.contact_phone,
      notes: booking.notes,
      total_price_cents: booking.total_price_cents,
      status: ModuleStatus::Pending,
      created_at: now,
      stay,
    };
    self.store.insert(order).await
  }

  fn ledger_title(&self, order: &HotelOrder) -> LedgerTitle {
    LedgerTitle {
      title: format!("{} hotel booking", order.room_name),
      description: format!("Hotel booking order {}", order.order_no),
    }
  }
}
