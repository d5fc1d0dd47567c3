// server/src/state.rs
use crate::config::AppConfig;
use crate::persistence::{
  MemoryUsers, PgBills, PgFoodOrders, PgHotelOrders, PgLedger, PgReviews, PgShopOrders, PgTravelOrders, PgUsers,
  UserStore,
};
use crate::services::SessionStore;
use sqlx::PgPool;
use std::sync::Arc;
use xihu_core::memory::{MemoryLedger, MemoryModuleStore, MemoryReviews};
use xihu_core::modules::{
  BillModule, FoodModule, HotelModule, HotelOrder, OverdueBills, PaymentBill, RestaurantOrder, ShopModule,
  ShopOrder, TravelModule, TravelOrder,
};
use xihu_core::{CheckoutService, LedgerStore, ModuleOrderStore, ModuleRegistry, OrderPlacement, ReviewStore};

/// Every storage port the app needs, from one backend.
#[derive(Clone)]
pub struct Stores {
  pub ledger: Arc<dyn LedgerStore>,
  pub hotels: Arc<dyn ModuleOrderStore<HotelOrder>>,
  pub food: Arc<dyn ModuleOrderStore<RestaurantOrder>>,
  pub shop: Arc<dyn ModuleOrderStore<ShopOrder>>,
  pub travel: Arc<dyn ModuleOrderStore<TravelOrder>>,
  pub bills: Arc<dyn ModuleOrderStore<PaymentBill>>,
  /// Same bill table as `bills`, seen through the sweep port.
  pub overdue_bills: Arc<dyn OverdueBills>,
  pub reviews: Arc<dyn ReviewStore>,
  pub users: Arc<dyn UserStore>,
}

impl Stores {
  pub fn in_memory() -> Self {
    let bills = Arc::new(MemoryModuleStore::<PaymentBill>::new());
    Self {
      ledger: Arc::new(MemoryLedger::new()),
      hotels: Arc::new(MemoryModuleStore::<HotelOrder>::new()),
      food: Arc::new(MemoryModuleStore::<RestaurantOrder>::new()),
      shop: Arc::new(MemoryModuleStore::<ShopOrder>::new()),
      travel: Arc::new(MemoryModuleStore::<TravelOrder>::new()),
      bills: bills.clone(),
      overdue_bills: bills,
      reviews: Arc::new(MemoryReviews::new()),
      users: Arc::new(MemoryUsers::new()),
    }
  }

  pub fn postgres(pool: PgPool) -> Self {
    let bills = Arc::new(PgBills::new(pool.clone()));
    Self {
      ledger: Arc::new(PgLedger::new(pool.clone())),
      hotels: Arc::new(PgHotelOrders::new(pool.clone())),
      food: Arc::new(PgFoodOrders::new(pool.clone())),
      shop: Arc::new(PgShopOrders::new(pool.clone())),
      travel: Arc::new(PgTravelOrders::new(pool.clone())),
      bills: bills.clone(),
      overdue_bills: bills,
      reviews: Arc::new(PgReviews::new(pool.clone())),
      users: Arc::new(PgUsers::new(pool)),
    }
  }
}

/// One placement workflow per module, built once at startup.
pub struct Placements {
  pub hotel: OrderPlacement<HotelModule>,
  pub food: OrderPlacement<FoodModule>,
  pub shop: OrderPlacement<ShopModule>,
  pub travel: OrderPlacement<TravelModule>,
  pub bill: OrderPlacement<BillModule>,
}

impl Placements {
  fn new(modules: &ModuleRegistry, ledger: &Arc<dyn LedgerStore>) -> Self {
    Self {
      hotel: OrderPlacement::new(modules.hotel.clone(), ledger.clone()),
      food: OrderPlacement::new(modules.food.clone(), ledger.clone()),
      shop: OrderPlacement::new(modules.shop.clone(), ledger.clone()),
      travel: OrderPlacement::new(modules.travel.clone(), ledger.clone()),
      bill: OrderPlacement::new(modules.bill.clone(), ledger.clone()),
    }
  }
}

#[derive(Clone)]
pub struct AppState {
  pub config: Arc<AppConfig>,
  pub stores: Stores,
  pub modules: ModuleRegistry,
  pub checkout: CheckoutService,
  pub placements: Arc<Placements>,
  pub sessions: Arc<SessionStore>,
}

impl AppState {
  pub fn new(config: Arc<AppConfig>, stores: Stores) -> Self {
    let modules = ModuleRegistry::new(
      stores.hotels.clone(),
      stores.food.clone(),
      stores.shop.clone(),
      stores.travel.clone(),
      stores.bills.clone(),
    );
    let checkout = CheckoutService::new(stores.ledger.clone(), modules.clone());
    let placements = Arc::new(Placements::new(&modules, &stores.ledger));
    let sessions = Arc::new(SessionStore::new(config.session_ttl_hours));
    Self {
      config,
      stores,
      modules,
      checkout,
      placements,
      sessions,
    }
  }
}
