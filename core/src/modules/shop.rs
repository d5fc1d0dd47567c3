// xihu_core/src/modules/shop.rs
use super::{LedgerTitle, OrderModule};
use crate::error::{LedgerError, LedgerResult};
use crate::linkage::generate_module_order_no;
use crate::model::{line_subtotal, LineItems, ModuleOrder, ModuleStatus, ModuleTransition, OrderType, ShopOrderLine};
use crate::store::ModuleOrderStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One cart line as submitted. Every field is required; a missing one fails the
/// whole checkout.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
  pub product_id: Option<i64>,
  pub name: Option<String>,
  pub unit_price_cents: Option<i64>,
  pub quantity: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopCheckout {
  pub items: Vec<CartItem>,
  #[serde(default)]
  pub shipping_name: Option<String>,
  #[serde(default)]
  pub shipping_phone: Option<String>,
  #[serde(default)]
  pub shipping_address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShopOrder {
  pub id: i64,
  pub order_no: String,
  pub unified_order_no: Option<String>,
  pub user_id: i64,
  pub total_amount_cents: i64,
  pub status: ModuleStatus,
  pub shipping_name: Option<String>,
  pub shipping_phone: Option<String>,
  pub shipping_address: Option<String>,
  pub payment_time: Option<DateTime<Utc>>,
  pub created_at: DateTime<Utc>,
  pub lines: Vec<ShopOrderLine>,
}

impl ModuleOrder for ShopOrder {
  const ORDER_TYPE: OrderType = OrderType::Shopping;

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

  fn line_items(&self) -> Option<LineItems> {
    Some(LineItems::Shopping(self.lines.clone()))
  }
}

fn priced_line(index: usize, item: &CartItem) -> LedgerResult<ShopOrderLine> {
  let incomplete = || LedgerError::validation(format!("cart item {} is missing a field", index + 1));
  let product_id = item.product_id.ok_or_else(incomplete)?;
  let product_name = item.name.clone().filter(|n| !n.trim().is_empty()).ok_or_else(incomplete)?;
  let unit_price_cents = item.unit_price_cents.ok_or_else(incomplete)?;
  let quantity = item.quantity.ok_or_else(incomplete)?;

  if quantity <= 0 || unit_price_cents < 0 {
    return Err(LedgerError::validation(format!(
      "cart item {} has an invalid price or quantity",
      index + 1
    )));
  }
  let subtotal_cents =
    line_subtotal(unit_price_cents, quantity).ok_or_else(|| LedgerError::validation("line subtotal overflows"))?;

  Ok(ShopOrderLine {
    product_id,
    product_name,
    unit_price_cents,
    quantity,
    subtotal_cents,
  })
}

/// Prices the cart. Fails on the first incomplete item.
pub fn price_cart(items: &[CartItem]) -> LedgerResult<(Vec<ShopOrderLine>, i64)> {
  let lines = items
    .iter()
    .enumerate()
    .map(|(i, item)| priced_line(i, item))
    .collect::<LedgerResult<Vec<_>>>()?;
  let total = lines
    .iter()
    .try_fold(0i64, |acc, line| acc.checked_add(line.subtotal_cents))
    .ok_or_else(|| LedgerError::validation("order total overflows"))?;
  Ok((lines, total))
}

pub struct ShopModule {
  store: Arc<dyn ModuleOrderStore<ShopOrder>>,
}

impl ShopModule {
  pub fn new(store: Arc<dyn ModuleOrderStore<ShopOrder>>) -> Self {
    Self { store }
  }
}

#[async_trait]
impl OrderModule for ShopModule {
  type Request = ShopCheckout;
  type Order = ShopOrder;

  fn store(&self) -> &Arc<dyn ModuleOrderStore<ShopOrder>> {
    &self.store
  }

  fn validate(&self, _user_id: i64, checkout: &ShopCheckout) -> LedgerResult<()> {
    if checkout.items.is_empty() {
      return Err(LedgerError::validation("cart is empty"));
    }
    price_cart(&checkout.items).map(|_| ())
  }

  async fn create(&self, user_id: i64, checkout: ShopCheckout) -> LedgerResult<ShopOrder> {
    let (lines, total) = price_cart(&checkout.items)?;
    let now = Utc::now();
    let order = ShopOrder {
      id: 0,
      order_no: generate_module_order_no("SHOP", now),
      unified_order_no: None,
      user_id,
      total_amount_cents: total,
      status: ModuleStatus::Pending,
      shipping_name: checkout.shipping_name,
      shipping_phone: checkout.shipping_phone,
      shipping_address: checkout.shipping_address,
      payment_time: None,
      created_at: now,
      lines,
    };
    self.store.insert(order).await
  }

  fn ledger_title(&self, order: &ShopOrder) -> LedgerTitle {
    let item_count: i64 = order.lines.iter().map(|l| i64::from(l.quantity)).sum();
    LedgerTitle {
      title: "Shopping order".to_string(),
      description: format!("Mall order {} ({} items)", order.order_no, item_count),
    }
  }
}
