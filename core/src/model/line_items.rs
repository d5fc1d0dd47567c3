// xihu_core/src/model/line_items.rs
use chrono::NaiveDate;
use serde::Serialize;

/// Per-stay detail row of a hotel order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HotelStayDetail {
  pub order_no: String,
  pub hotel_id: i64,
  pub hotel_name: String,
  pub room_type: String,
  pub check_in: NaiveDate,
  pub check_out: NaiveDate,
  pub nights: i64,
  pub guests: i32,
  pub room_price_cents: i64,
  pub subtotal_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FoodOrderLine {
  pub menu_id: i64,
  pub menu_name: String,
  pub unit_price_cents: i64,
  pub quantity: i32,
  pub subtotal_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopOrderLine {
  pub product_id: i64,
  pub product_name: String,
  pub unit_price_cents: i64,
  pub quantity: i32,
  pub subtotal_cents: i64,
}

/// Detail rows shown on the checkout page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LineItems {
  Hotel(Vec<HotelStayDetail>),
  Food(Vec<FoodOrderLine>),
  Shopping(Vec<ShopOrderLine>),
}

impl LineItems {
  pub fn len(&self) -> usize {
    match self {
      LineItems::Hotel(rows) => rows.len(),
      LineItems::Food(rows) => rows.len(),
      LineItems::Shopping(rows) => rows.len(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// `unit_price * quantity`, refusing overflow.
pub fn line_subtotal(unit_price_cents: i64, quantity: i32) -> Option<i64> {
  unit_price_cents.checked_mul(i64::from(quantity))
}
