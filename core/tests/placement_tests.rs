// tests/placement_tests.rs
mod common;

use common::*;
use serial_test::serial;
use std::sync::Arc;
use xihu_core::memory::MemoryModuleStore;
use xihu_core::model::{BillStatus, LineItems, ModuleStatus};
use xihu_core::modules::{
  per_night_cents, stay_nights, BillPaymentRequest, CartItem, FoodModule, HotelModule, OverdueBills, ShopModule,
  TravelModule, TravelOrder,
};
use xihu_core::placement::{
  checkout_redirect_url, STEP_BACK_LINK_MODULE_ORDER, STEP_CREATE_LEDGER_ENTRY, STEP_INSERT_MODULE_ORDER,
  STEP_REUSE_UNPAID_LEDGER_ENTRY, STEP_VALIDATE_REQUEST,
};
use xihu_core::{LedgerError, LedgerStore, ModuleOrderRef, OrderPlacement, OrderType, PaymentStatus};

#[test]
fn test_stay_nights_and_per_night_price() {
  assert_eq!(stay_nights(date(2024, 1, 10), date(2024, 1, 12)), 2);
  assert_eq!(per_night_cents(40_000, 2), 20_000);
  // Same-day and reversed stays count as one night.
  assert_eq!(stay_nights(date(2024, 1, 10), date(2024, 1, 10)), 1);
  assert_eq!(stay_nights(date(2024, 1, 12), date(2024, 1, 10)), 1);
}

#[tokio::test]
#[serial]
async fn test_placement_workflow_step_order() {
  setup_tracing();
  let fixture = Fixture::new();
  let placement = OrderPlacement::new(fixture.modules.bill.clone(), fixture.ledger_dyn());
  assert_eq!(
    placement.workflow().step_names(),
    vec![
      STEP_VALIDATE_REQUEST,
      STEP_INSERT_MODULE_ORDER,
      STEP_REUSE_UNPAID_LEDGER_ENTRY,
      STEP_CREATE_LEDGER_ENTRY,
      STEP_BACK_LINK_MODULE_ORDER,
    ]
  );
  assert!(placement.workflow().has_handler(STEP_REUSE_UNPAID_LEDGER_ENTRY));

  let hotel = OrderPlacement::new(fixture.modules.hotel.clone(), fixture.ledger_dyn());
  assert!(!hotel.workflow().has_handler(STEP_REUSE_UNPAID_LEDGER_ENTRY));
}

#[tokio::test]
#[serial]
async fn test_hotel_booking_links_ledger_and_module_order() {
  setup_tracing();
  let fixture = Fixture::new();
  let placement = OrderPlacement::new(fixture.modules.hotel.clone(), fixture.ledger_dyn());

  let placed = placement.place(ALICE, hotel_booking(40_000)).await.unwrap();

  assert!(placed.back_linked);
  assert!(!placed.reused);
  assert_eq!(placed.amount_cents, 40_000);
  assert_eq!(placed.redirect_url, checkout_redirect_url(&placed.order_no));
  assert!(placed.module_order_no.as_deref().unwrap().starts_with("HOTEL"));

  let hotel_order = fixture.hotels.get(placed.module_order_id).unwrap();
  assert_eq!(hotel_order.unified_order_no.as_deref(), Some(placed.order_no.as_str()));
  assert_eq!(hotel_order.stay.nights, 2);
  assert_eq!(hotel_order.stay.room_price_cents, 20_000);
  assert_eq!(hotel_order.status, ModuleStatus::Pending);

  let ledger_row = fixture.ledger.find_by_order_no(&placed.order_no).await.unwrap().unwrap();
  assert!(ledger_row.order_no.starts_with("UOHOTEL"));
  assert_eq!(ledger_row.order_type, OrderType::Hotel);
  assert_eq!(ledger_row.module_ref, Some(ModuleOrderRef::Hotel(placed.module_order_id)));
  assert_eq!(ledger_row.user_id, ALICE);
  assert_eq!(ledger_row.total_amount_cents, hotel_order.total_price_cents);
  assert_eq!(ledger_row.payment_status, PaymentStatus::Unpaid);
  assert_eq!(ledger_row.title, "Lake View King hotel booking");
}

#[tokio::test]
#[serial]
async fn test_takeout_total_is_recomputed_from_lines() {
  setup_tracing();
  let fixture = Fixture::new();
  let placement = OrderPlacement::new(fixture.modules.food.clone(), fixture.ledger_dyn());

  let placed = placement
    .place(ALICE, takeout(&[(1, "West Lake fish", 6_800, 1), (2, "Dongpo pork", 4_200, 2)]))
    .await
    .unwrap();

  assert_eq!(placed.amount_cents, 6_800 + 2 * 4_200);
  let order = fixture.food.get(placed.module_order_id).unwrap();
  assert_eq!(order.lines.len(), 2);
  assert_eq!(order.lines[1].subtotal_cents, 8_400);
  assert_eq!(order.special_requirements.as_deref(), Some("Delivery address: 1 Nanshan Rd"));
  let ledger_row = fixture.ledger.find_by_order_no(&placed.order_no).await.unwrap().unwrap();
  assert_eq!(ledger_row.total_amount_cents, 15_200);
  assert!(ledger_row.order_no.starts_with("UOFOOD"));
}

#[tokio::test]
#[serial]
async fn test_takeout_without_items_is_rejected_before_any_write() {
  setup_tracing();
  let fixture = Fixture::new();
  let placement = OrderPlacement::new(fixture.modules.food.clone(), fixture.ledger_dyn());

  let result = placement.place(ALICE, takeout(&[])).await;
  assert!(matches!(result, Err(LedgerError::Validation(_))));
  assert!(fixture.food.is_empty());
  assert!(fixture.ledger.is_empty());
}

#[tokio::test]
#[serial]
async fn test_shop_checkout_with_incomplete_item_fails_whole_cart() {
  setup_tracing();
  let fixture = Fixture::new();
  let placement = OrderPlacement::new(fixture.modules.shop.clone(), fixture.ledger_dyn());

  let broken = CartItem {
    quantity: None,
    ..cart_item(2, "Longjing tea", 12_000, 1)
  };
  let result = placement
    .place(ALICE, shop_checkout(vec![cart_item(1, "Silk scarf", 9_900, 1), broken]))
    .await;

  match result {
    Err(LedgerError::Validation(msg)) => assert!(msg.contains("cart item 2")),
    other => panic!("Expected validation error, got {:?}", other),
  }
  assert!(fixture.shop.is_empty());
  assert!(fixture.ledger.is_empty());
}

#[tokio::test]
#[serial]
async fn test_two_checkouts_of_same_cart_create_distinct_ledger_rows() {
  setup_tracing();
  let fixture = Fixture::new();
  let placement = OrderPlacement::new(fixture.modules.shop.clone(), fixture.ledger_dyn());
  let cart = || shop_checkout(vec![cart_item(1, "Silk scarf", 9_900, 2)]);

  let first = placement.place(ALICE, cart()).await.unwrap();
  let second = placement.place(ALICE, cart()).await.unwrap();

  assert_ne!(first.order_no, second.order_no);
  assert_ne!(first.module_order_id, second.module_order_id);
  assert_eq!(first.amount_cents, 19_800);
  assert_eq!(fixture.ledger.len(), 2);

  fixture.checkout.process_payment(&first.order_no, ALICE, "alipay").await.unwrap();
  fixture.checkout.process_payment(&second.order_no, ALICE, "wechat").await.unwrap();
}

#[tokio::test]
#[serial]
async fn test_travel_total_is_count_times_price() {
  setup_tracing();
  let fixture = Fixture::new();
  let placement = OrderPlacement::new(fixture.modules.travel.clone(), fixture.ledger_dyn());

  let placed = placement.place(BOB, ticket_booking(3, 8_000)).await.unwrap();

  assert_eq!(placed.amount_cents, 24_000);
  assert!(placed.back_linked);
  let order = fixture.travel.get(placed.module_order_id).unwrap();
  assert_eq!(order.unified_order_no.as_deref(), Some(placed.order_no.as_str()));
  assert_eq!(order.user_id, BOB);
}

#[tokio::test]
#[serial]
async fn test_back_link_failure_leaves_orphaned_unpaid_row() {
  setup_tracing();
  let fixture = Fixture::new();
  let inner = Arc::new(MemoryModuleStore::<TravelOrder>::new());
  let module = Arc::new(TravelModule::new(Arc::new(BackLinkRefusingStore { inner: inner.clone() })));
  let placement = OrderPlacement::new(module, fixture.ledger_dyn());

  let placed = placement.place(ALICE, ticket_booking(1, 8_000)).await.unwrap();

  assert!(!placed.back_linked);
  let ledger_row = fixture.ledger.find_by_order_no(&placed.order_no).await.unwrap().unwrap();
  assert_eq!(ledger_row.payment_status, PaymentStatus::Unpaid);
  assert_eq!(inner.get(placed.module_order_id).unwrap().unified_order_no, None);
}

#[tokio::test]
#[serial]
async fn test_paying_bill_twice_reuses_unpaid_ledger_row() {
  setup_tracing();
  let fixture = Fixture::new();
  let bill = fixture.seed_bill(ALICE, 15_630, date(2030, 1, 31)).await;
  let placement = OrderPlacement::new(fixture.modules.bill.clone(), fixture.ledger_dyn());

  let first = placement.place(ALICE, BillPaymentRequest { bill_id: bill.id }).await.unwrap();
  let second = placement.place(ALICE, BillPaymentRequest { bill_id: bill.id }).await.unwrap();

  assert!(!first.reused);
  assert!(second.reused);
  assert!(second.back_linked);
  assert_eq!(first.order_no, second.order_no);
  assert!(first.order_no.starts_with("UOPAY"));
  assert_eq!(fixture.ledger.len(), 1);
  assert_eq!(
    fixture.bills.get(bill.id).unwrap().unified_order_no.as_deref(),
    Some(first.order_no.as_str())
  );
}

#[tokio::test]
#[serial]
async fn test_bill_after_cancelled_ledger_row_gets_fresh_row() {
  setup_tracing();
  let fixture = Fixture::new();
  let bill = fixture.seed_bill(ALICE, 8_800, date(2030, 1, 31)).await;
  let placement = OrderPlacement::new(fixture.modules.bill.clone(), fixture.ledger_dyn());

  let first = placement.place(ALICE, BillPaymentRequest { bill_id: bill.id }).await.unwrap();
  fixture.checkout.cancel_order(&first.order_no, ALICE).await.unwrap();
  let second = placement.place(ALICE, BillPaymentRequest { bill_id: bill.id }).await.unwrap();

  assert!(!second.reused);
  assert_ne!(first.order_no, second.order_no);
  // Cancelling the ledger row leaves the bill itself payable.
  assert_eq!(fixture.bills.get(bill.id).unwrap().status, BillStatus::Unpaid);
}

#[tokio::test]
#[serial]
async fn test_bill_payment_checks_existence_owner_and_status() {
  setup_tracing();
  let fixture = Fixture::new();
  let bill = fixture.seed_bill(ALICE, 5_000, date(2030, 1, 31)).await;
  let placement = OrderPlacement::new(fixture.modules.bill.clone(), fixture.ledger_dyn());

  let missing = placement.place(ALICE, BillPaymentRequest { bill_id: 999 }).await;
  assert!(matches!(missing, Err(LedgerError::NotFound { .. })));

  let foreign = placement.place(BOB, BillPaymentRequest { bill_id: bill.id }).await;
  assert!(matches!(foreign, Err(LedgerError::Forbidden { .. })));

  let placed = placement.place(ALICE, BillPaymentRequest { bill_id: bill.id }).await.unwrap();
  fixture.checkout.process_payment(&placed.order_no, ALICE, "balance").await.unwrap();
  let paid_bill = fixture.bills.get(bill.id).unwrap();
  assert_eq!(paid_bill.status, BillStatus::Paid);
  assert!(paid_bill.paid_time.is_some());

  let again = placement.place(ALICE, BillPaymentRequest { bill_id: bill.id }).await;
  assert!(matches!(again, Err(LedgerError::Validation(_))));
}

#[tokio::test]
#[serial]
async fn test_overdue_sweep_flips_only_past_due_unpaid_bills() {
  setup_tracing();
  let fixture = Fixture::new();
  let past_due = fixture.seed_bill(ALICE, 1_000, date(2024, 1, 1)).await;
  let not_due = fixture.seed_bill(ALICE, 2_000, date(2024, 3, 1)).await;

  let today = date(2024, 2, 1);
  assert!(past_due.is_overdue(today));
  assert!(!not_due.is_overdue(today));

  assert_eq!(fixture.bills.mark_overdue(today).await.unwrap(), 1);
  assert_eq!(fixture.bills.get(past_due.id).unwrap().status, BillStatus::Overdue);
  assert_eq!(fixture.bills.get(not_due.id).unwrap().status, BillStatus::Unpaid);
  // Already overdue bills are not counted again.
  assert_eq!(fixture.bills.mark_overdue(today).await.unwrap(), 0);
}

#[tokio::test]
#[serial]
async fn test_overdue_bill_can_still_be_paid() {
  setup_tracing();
  let fixture = Fixture::new();
  let bill = fixture.seed_bill(ALICE, 1_000, date(2024, 1, 1)).await;
  fixture.bills.mark_overdue(date(2024, 2, 1)).await.unwrap();

  let placement = OrderPlacement::new(fixture.modules.bill.clone(), fixture.ledger_dyn());
  let placed = placement.place(ALICE, BillPaymentRequest { bill_id: bill.id }).await.unwrap();
  fixture.checkout.process_payment(&placed.order_no, ALICE, "alipay").await.unwrap();

  assert_eq!(fixture.bills.get(bill.id).unwrap().status, BillStatus::Paid);
}

#[tokio::test]
#[serial]
async fn test_standalone_modules_can_be_built_directly() {
  setup_tracing();
  let fixture = Fixture::new();
  let hotel = Arc::new(HotelModule::new(fixture.hotels.clone()));
  let food = Arc::new(FoodModule::new(fixture.food.clone()));
  let shop = Arc::new(ShopModule::new(fixture.shop.clone()));

  let h = OrderPlacement::new(hotel, fixture.ledger_dyn()).place(ALICE, hotel_booking(10_000)).await.unwrap();
  let f = OrderPlacement::new(food, fixture.ledger_dyn())
    .place(ALICE, takeout(&[(1, "Noodles", 1_800, 1)]))
    .await
    .unwrap();
  let s = OrderPlacement::new(shop, fixture.ledger_dyn())
    .place(ALICE, shop_checkout(vec![cart_item(1, "Fan", 3_000, 1)]))
    .await
    .unwrap();

  let view = fixture.checkout.checkout(&s.order_no, ALICE).await.unwrap();
  assert!(matches!(view.order_details, Some(LineItems::Shopping(ref lines)) if lines.len() == 1));
  assert_eq!(fixture.ledger.len(), 3);
  assert!(h.back_linked && f.back_linked && s.back_linked);
}
