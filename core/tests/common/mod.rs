// tests/common/mod.rs
#![allow(dead_code)] // Each test binary uses a different subset.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::Level;
use xihu_core::memory::{MemoryLedger, MemoryModuleStore};
use xihu_core::model::{
  BillStatus, LedgerFilter, ModuleOrder, ModuleOrderRef, ModuleTransition, NewLedgerEntry, OrderStats, UnifiedOrder,
};
use xihu_core::modules::{
  CartItem, HotelBooking, HotelOrder, PaymentBill, RestaurantOrder, ShopCheckout, ShopOrder, TakeoutItem,
  TakeoutRequest, TicketBooking, TravelOrder,
};
use xihu_core::workflow::StepFuture;
use xihu_core::{
  CheckoutService, ContextData, LedgerError, LedgerResult, LedgerStore, ModuleOrderStore, ModuleRegistry,
  StepControl,
};

pub const ALICE: i64 = 1;
pub const BOB: i64 = 2;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

// --- Workflow test context ---

#[derive(Clone, Debug, Default)]
pub struct TestContext {
  pub counter: i32,
  pub steps_executed: Vec<String>,
  pub stop_at: Option<String>,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  #[error("Ledger error: {0}")]
  Ledger(String),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl From<LedgerError> for TestError {
  fn from(err: LedgerError) -> Self {
    TestError::Ledger(format!("{:?}", err))
  }
}

pub fn recording_handler(
  step_name: &'static str,
) -> impl Fn(ContextData<TestContext>) -> StepFuture<TestError> + Send + Sync + 'static {
  move |ctx: ContextData<TestContext>| -> StepFuture<TestError> {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.steps_executed.push(step_name.to_string());
      if guard.stop_at.as_deref() == Some(step_name) {
        return Ok(StepControl::Stop);
      }
      Ok(StepControl::Continue)
    })
  }
}

// --- Ledger fixture ---

/// Memory stores for every module, wired into a registry and a checkout service.
pub struct Fixture {
  pub ledger: Arc<MemoryLedger>,
  pub hotels: Arc<MemoryModuleStore<HotelOrder>>,
  pub food: Arc<MemoryModuleStore<RestaurantOrder>>,
  pub shop: Arc<MemoryModuleStore<ShopOrder>>,
  pub travel: Arc<MemoryModuleStore<TravelOrder>>,
  pub bills: Arc<MemoryModuleStore<PaymentBill>>,
  pub modules: ModuleRegistry,
  pub checkout: CheckoutService,
}

impl Fixture {
  pub fn new() -> Self {
    let ledger = Arc::new(MemoryLedger::new());
    let hotels = Arc::new(MemoryModuleStore::<HotelOrder>::new());
    let food = Arc::new(MemoryModuleStore::<RestaurantOrder>::new());
    let shop = Arc::new(MemoryModuleStore::<ShopOrder>::new());
    let travel = Arc::new(MemoryModuleStore::<TravelOrder>::new());
    let bills = Arc::new(MemoryModuleStore::<PaymentBill>::new());

    let modules = ModuleRegistry::new(
      hotels.clone(),
      food.clone(),
      shop.clone(),
      travel.clone(),
      bills.clone(),
    );
    let checkout = CheckoutService::new(ledger.clone(), modules.clone());

    Self {
      ledger,
      hotels,
      food,
      shop,
      travel,
      bills,
      modules,
      checkout,
    }
  }

  pub fn ledger_dyn(&self) -> Arc<dyn LedgerStore> {
    self.ledger.clone()
  }

  pub async fn seed_bill(&self, user_id: i64, amount_cents: i64, due_date: NaiveDate) -> PaymentBill {
    self
      .bills
      .insert(PaymentBill {
        id: 0,
        user_id,
        bill_number: format!("BILL-{}-{}", user_id, amount_cents),
        payment_type_name: "Electricity".to_string(),
        bill_period: "2024-01".to_string(),
        amount_cents,
        due_date,
        status: BillStatus::Unpaid,
        paid_time: None,
        unified_order_no: None,
        created_at: Utc::now(),
      })
      .await
      .expect("seeding a bill into memory cannot fail")
  }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
}

// --- Sample requests ---

pub fn hotel_booking(total_price_cents: i64) -> HotelBooking {
  HotelBooking {
    hotel_id: 7,
    hotel_name: Some("West Lake Inn".to_string()),
    room_id: 70,
    room_name: "Lake View King".to_string(),
    check_in: date(2024, 1, 10),
    check_out: date(2024, 1, 12),
    guests: 2,
    contact_name: "Alice".to_string(),
    contact_phone: "13800000000".to_string(),
    notes: None,
    total_price_cents,
  }
}

pub fn takeout(items: &[(i64, &str, i64, i32)]) -> TakeoutRequest {
  TakeoutRequest {
    restaurant_id: 3,
    restaurant_name: Some("Lou Wai Lou".to_string()),
    items: items
      .iter()
      .map(|(menu_id, name, price, qty)| TakeoutItem {
        menu_id: *menu_id,
        menu_name: name.to_string(),
        unit_price_cents: *price,
        quantity: *qty,
      })
      .collect(),
    address: Some("1 Nanshan Rd".to_string()),
    contact_name: Some("Alice".to_string()),
    contact_phone: Some("13800000000".to_string()),
  }
}

pub fn cart_item(product_id: i64, name: &str, price: i64, qty: i32) -> CartItem {
  CartItem {
    product_id: Some(product_id),
    name: Some(name.to_string()),
    unit_price_cents: Some(price),
    quantity: Some(qty),
  }
}

pub fn shop_checkout(items: Vec<CartItem>) -> ShopCheckout {
  ShopCheckout {
    items,
    shipping_name: Some("Alice".to_string()),
    shipping_phone: None,
    shipping_address: Some("1 Nanshan Rd".to_string()),
  }
}

pub fn ticket_booking(count: i32, price_cents: i64) -> TicketBooking {
  TicketBooking {
    attraction_id: 11,
    attraction_name: "Leifeng Pagoda".to_string(),
    visit_date: date(2024, 5, 1),
    ticket_count: count,
    ticket_price_cents: price_cents,
    contact_name: None,
    contact_phone: None,
  }
}

// --- Fault injection ---

/// Delegates to a memory store but refuses every back-link write.
pub struct BackLinkRefusingStore<O: ModuleOrder> {
  pub inner: Arc<MemoryModuleStore<O>>,
}

#[async_trait]
impl<O: ModuleOrder> ModuleOrderStore<O> for BackLinkRefusingStore<O> {
  async fn insert(&self, order: O) -> LedgerResult<O> {
    self.inner.insert(order).await
  }

  async fn find(&self, id: i64) -> LedgerResult<Option<O>> {
    self.inner.find(id).await
  }

  async fn set_unified_order_no(&self, _id: i64, _order_no: &str) -> LedgerResult<bool> {
    Err(anyhow::anyhow!("connection reset while writing back-link").into())
  }

  async fn transition(&self, id: i64, transition: ModuleTransition, at: DateTime<Utc>) -> LedgerResult<bool> {
    self.inner.transition(id, transition, at).await
  }
}

/// Fails the first `clashes` inserts as a duplicate order number, then delegates.
pub struct ClashingLedger {
  pub inner: Arc<MemoryLedger>,
  pub clashes: AtomicUsize,
  pub attempted: Mutex<Vec<String>>,
}

impl ClashingLedger {
  pub fn new(clashes: usize) -> Self {
    Self {
      inner: Arc::new(MemoryLedger::new()),
      clashes: AtomicUsize::new(clashes),
      attempted: Mutex::new(Vec::new()),
    }
  }
}

#[async_trait]
impl LedgerStore for ClashingLedger {
  async fn insert(&self, entry: NewLedgerEntry) -> LedgerResult<UnifiedOrder> {
    self.attempted.lock().push(entry.order_no.clone());
    let remaining = self.clashes.load(Ordering::SeqCst);
    if remaining > 0 {
      self.clashes.store(remaining - 1, Ordering::SeqCst);
      return Err(LedgerError::Persistence(format!("duplicate order number {}", entry.order_no)));
    }
    self.inner.insert(entry).await
  }

  async fn find_by_order_no(&self, order_no: &str) -> LedgerResult<Option<UnifiedOrder>> {
    self.inner.find_by_order_no(order_no).await
  }

  async fn list_for_user(&self, user_id: i64, filter: &LedgerFilter) -> LedgerResult<Vec<UnifiedOrder>> {
    self.inner.list_for_user(user_id, filter).await
  }

  async fn find_unpaid_for_module(&self, module_ref: ModuleOrderRef) -> LedgerResult<Option<UnifiedOrder>> {
    self.inner.find_unpaid_for_module(module_ref).await
  }

  async fn mark_paid(&self, order_no: &str, payment_method: &str, paid_at: DateTime<Utc>) -> LedgerResult<bool> {
    self.inner.mark_paid(order_no, payment_method, paid_at).await
  }

  async fn cancel(&self, order_no: &str) -> LedgerResult<bool> {
    self.inner.cancel(order_no).await
  }

  async fn delete_cancelled(&self, order_no: &str, user_id: i64) -> LedgerResult<bool> {
    self.inner.delete_cancelled(order_no, user_id).await
  }

  async fn stats_for_user(&self, user_id: i64) -> LedgerResult<OrderStats> {
    self.inner.stats_for_user(user_id).await
  }
}
