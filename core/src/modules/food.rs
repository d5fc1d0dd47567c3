// xihu_core/src/modules/food.rs
use super::{LedgerTitle, OrderModule};
use crate::error::{LedgerError, LedgerResult};
use crate::model::{line_subtotal, FoodOrderLine, LineItems, ModuleOrder, ModuleStatus, ModuleTransition, OrderType};
use crate::store::ModuleOrderStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_RESTAURANT_NAME: &str = "Restaurant";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TakeoutItem {
  pub menu_id: i64,
  pub menu_name: String,
  pub unit_price_cents: i64,
  pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TakeoutRequest {
  pub restaurant_id: i64,
  #[serde(default)]
  pub restaurant_name: Option<String>,
  pub items: Vec<TakeoutItem>,
  #[serde(default)]
  pub address: Option<String>,
  #[serde(default)]
  pub contact_name: Option<String>,
  #[serde(default)]
  pub contact_phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantOrder {
  pub id: i64,
  pub unified_order_no: Option<String>,
  pub user_id: i64,
  pub restaurant_id: i64,
  pub restaurant_name: String,
  pub total_amount_cents: i64,
  pub status: ModuleStatus,
  pub contact_name: Option<String>,
  pub contact_phone: Option<String>,
  pub special_requirements: Option<String>,
  pub people_count: i32,
  pub created_at: DateTime<Utc>,
  pub lines: Vec<FoodOrderLine>,
}

impl ModuleOrder for RestaurantOrder {
  const ORDER_TYPE: OrderType = OrderType::Food;

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
    Some(LineItems::Food(self.lines.clone()))
  }
}

/// Prices every item and sums the lines. The client's own total is never trusted.
pub fn price_takeout_items(items: &[TakeoutItem]) -> LedgerResult<(Vec<FoodOrderLine>, i64)> {
  let mut total: i64 = 0;
  let mut lines = Vec::with_capacity(items.len());
  for item in items {
    let subtotal = line_subtotal(item.unit_price_cents, item.quantity)
      .ok_or_else(|| LedgerError::validation("line subtotal overflows"))?;
    total = total
      .checked_add(subtotal)
      .ok_or_else(|| LedgerError::validation("order total overflows"))?;
    lines.push(FoodOrderLine {
      menu_id: item.menu_id,
      menu_name: item.menu_name.clone(),
      unit_price_cents: item.unit_price_cents,
      quantity: item.quantity,
      subtotal_cents: subtotal,
    });
  }
  Ok((lines, total))
}

pub struct FoodModule {
  store: Arc<dyn ModuleOrderStore<RestaurantOrder>>,
}

impl FoodModule {
  pub fn new(store: Arc<dyn ModuleOrderStore<RestaurantOrder>>) -> Self {
    Self { store }
  }
}

#[async_trait]
impl OrderModule for FoodModule {
  type Request = TakeoutRequest;
  type Order = RestaurantOrder;

  fn store(&self) -> &Arc<dyn ModuleOrderStore<RestaurantOrder>> {
    &self.store
  }

  fn validate(&self, _user_id: i64, request: &TakeoutRequest) -> LedgerResult<()> {
    if request.items.is_empty() {
      return Err(LedgerError::validation("order has no items"));
    }
    for item in &request.items {
      if item.menu_name.trim().is_empty() {
        return Err(LedgerError::validation(format!("menu item {} has no name", item.menu_id)));
      }
      if item.quantity <= 0 {
        return Err(LedgerError::validation(format!(
          "menu item {} has a non-positive quantity",
          item.menu_id
        )));
      }
      if item.unit_price_cents < 0 {
        return Err(LedgerError::validation(format!("menu item {} has a negative price", item.menu_id)));
      }
    }
    Ok(())
  }

  async fn create(&self, user_id: i64, request: TakeoutRequest) -> LedgerResult<RestaurantOrder> {
    let (lines, total) = price_takeout_items(&request.items)?;
    let restaurant_name = request
      .restaurant_name
      .filter(|n| !n.trim().is_empty())
      .unwrap_or_else(|| DEFAULT_RESTAURANT_NAME.to_string());

    let order = RestaurantOrder {
      id: 0,
      unified_order_no: None,
      user_id,
      restaurant_id: request.restaurant_id,
      restaurant_name,
      total_amount_cents: total,
      status: ModuleStatus::Pending,
      contact_name: request.contact_name,
      contact_phone: request.contact_phone,
      special_requirements: request.address.map(|a| format!("Delivery address: {}", a)),
      people_count: 1,
      created_at: Utc::now(),
      lines,
    };
    self.store.insert(order).await
  }

  fn ledger_title(&self, order: &RestaurantOrder) -> LedgerTitle {
    LedgerTitle {
      title: format!("{} takeout order", order.restaurant_name),
      description: format!("Takeout order - {}", order.restaurant_name),
    }
  }
}
