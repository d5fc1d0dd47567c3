// xihu_core/src/modules/mod.rs

//! The five order-producing business modules behind one trait.

pub mod bill;
pub mod food;
pub mod hotel;
pub mod shop;
pub mod travel;

pub use bill::{BillModule, BillPaymentRequest, OverdueBills, PaymentBill};
pub use food::{FoodModule, RestaurantOrder, TakeoutItem, TakeoutRequest};
pub use hotel::{per_night_cents, stay_nights, HotelBooking, HotelModule, HotelOrder};
pub use shop::{CartItem, ShopCheckout, ShopModule, ShopOrder};
pub use travel::{TicketBooking, TravelModule, TravelOrder};

use crate::error::LedgerResult;
use crate::model::{LineItems, ModuleOrder, ModuleOrderRef, ModuleTransition, OrderType};
use crate::store::ModuleOrderStore;
use async_trait::async_trait;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Ledger title and description for a module order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTitle {
  pub title: String,
  pub description: String,
}

#[async_trait]
pub trait OrderModule: Send + Sync + 'static {
  /// What the client submits to place an order.
  type Request: Send + Sync + 'static;
  type Order: ModuleOrder;

  fn order_type(&self) -> OrderType {
    <Self::Order as ModuleOrder>::ORDER_TYPE
  }

  fn store(&self) -> &Arc<dyn ModuleOrderStore<Self::Order>>;

  /// Checks the request before anything is written.
  fn validate(&self, user_id: i64, request: &Self::Request) -> LedgerResult<()>;

  /// Produces the module order the ledger row will point at. Most modules insert
  /// a new row; bills look up an existing one.
  async fn create(&self, user_id: i64, request: Self::Request) -> LedgerResult<Self::Order>;

  fn ledger_title(&self, order: &Self::Order) -> LedgerTitle;

  /// Whether a retry should reuse an `Unpaid` ledger row already pointing at the
  /// module order instead of creating a new one.
  fn reuses_unpaid_ledger_entry(&self) -> bool {
    false
  }

  async fn find(&self, id: i64) -> LedgerResult<Option<Self::Order>> {
    self.store().find(id).await
  }

  async fn back_link(&self, id: i64, order_no: &str) -> LedgerResult<bool> {
    self.store().set_unified_order_no(id, order_no).await
  }

  async fn confirm(&self, id: i64) -> LedgerResult<bool> {
    self.store().transition(id, ModuleTransition::Confirm, Utc::now()).await
  }

  async fn cancel(&self, id: i64) -> LedgerResult<bool> {
    self.store().transition(id, ModuleTransition::Cancel, Utc::now()).await
  }

  /// Line items of the order, but only when it is really the one the ledger row
  /// names: same id, same owner, and back-linked to `order_no`.
  async fn verified_line_items(&self, id: i64, user_id: i64, order_no: &str) -> LedgerResult<Option<LineItems>> {
    let Some(order) = self.find(id).await? else {
      debug!(id, "Module order missing; no line items.");
      return Ok(None);
    };
    if order.id() != id || order.user_id() != user_id || order.unified_order_no() != Some(order_no) {
      debug!(id, "Module order does not match ledger row; no line items.");
      return Ok(None);
    }
    Ok(order.line_items().filter(|items| !items.is_empty()))
  }
}

/// All five modules, addressable by `ModuleOrderRef`.
#[derive(Clone)]
pub struct ModuleRegistry {
  pub hotel: Arc<HotelModule>,
  pub food: Arc<FoodModule>,
  pub shop: Arc<ShopModule>,
  pub travel: Arc<TravelModule>,
  pub bill: Arc<BillModule>,
}

impl ModuleRegistry {
  pub fn new(
    hotel_store: Arc<dyn ModuleOrderStore<HotelOrder>>,
    food_store: Arc<dyn ModuleOrderStore<RestaurantOrder>>,
    shop_store: Arc<dyn ModuleOrderStore<ShopOrder>>,
    travel_store: Arc<dyn ModuleOrderStore<TravelOrder>>,
    bill_store: Arc<dyn ModuleOrderStore<PaymentBill>>,
  ) -> Self {
    Self {
      hotel: Arc::new(HotelModule::new(hotel_store)),
      food: Arc::new(FoodModule::new(food_store)),
      shop: Arc::new(ShopModule::new(shop_store)),
      travel: Arc::new(TravelModule::new(travel_store)),
      bill: Arc::new(BillModule::new(bill_store)),
    }
  }

  /// Marks the referenced module order paid.
  #[instrument(name = "ModuleRegistry::confirm", skip(self))]
  pub async fn confirm(&self, module_ref: ModuleOrderRef) -> LedgerResult<bool> {
    match module_ref {
      ModuleOrderRef::Hotel(id) => self.hotel.confirm(id).await,
      ModuleOrderRef::Food(id) => self.food.confirm(id).await,
      ModuleOrderRef::Shopping(id) => self.shop.confirm(id).await,
      ModuleOrderRef::Travel(id) => self.travel.confirm(id).await,
      ModuleOrderRef::Payment(id) => self.bill.confirm(id).await,
    }
  }

  /// Cancels the referenced module order. Bills cannot be cancelled and report `false`.
  #[instrument(name = "ModuleRegistry::cancel", skip(self))]
  pub async fn cancel(&self, module_ref: ModuleOrderRef) -> LedgerResult<bool> {
    match module_ref {
      ModuleOrderRef::Hotel(id) => self.hotel.cancel(id).await,
      ModuleOrderRef::Food(id) => self.food.cancel(id).await,
      ModuleOrderRef::Shopping(id) => self.shop.cancel(id).await,
      ModuleOrderRef::Travel(id) => self.travel.cancel(id).await,
      ModuleOrderRef::Payment(_) => Ok(false),
    }
  }

  /// Cross-checked line items for the checkout page. Travel and bill orders have none.
  pub async fn verified_line_items(
    &self,
    module_ref: ModuleOrderRef,
    user_id: i64,
    order_no: &str,
  ) -> LedgerResult<Option<LineItems>> {
    match module_ref {
      ModuleOrderRef::Hotel(id) => self.hotel.verified_line_items(id, user_id, order_no).await,
      ModuleOrderRef::Food(id) => self.food.verified_line_items(id, user_id, order_no).await,
      ModuleOrderRef::Shopping(id) => self.shop.verified_line_items(id, user_id, order_no).await,
      ModuleOrderRef::Travel(_) | ModuleOrderRef::Payment(_) => Ok(None),
    }
  }
}
