use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use tokio::runtime::Runtime;
use xihu_core::memory::{MemoryLedger, MemoryModuleStore};
use xihu_core::modules::{
  CartItem, HotelOrder, PaymentBill, RestaurantOrder, ShopCheckout, ShopOrder, TicketBooking, TravelOrder,
};
use xihu_core::{
  CheckoutService, ContextData, LedgerStore, ModuleRegistry, OrderPlacement, StepControl, Workflow,
};

fn registry() -> (Arc<dyn LedgerStore>, ModuleRegistry) {
  let ledger: Arc<dyn LedgerStore> = Arc::new(MemoryLedger::new());
  let modules = ModuleRegistry::new(
    Arc::new(MemoryModuleStore::<HotelOrder>::new()),
    Arc::new(MemoryModuleStore::<RestaurantOrder>::new()),
    Arc::new(MemoryModuleStore::<ShopOrder>::new()),
    Arc::new(MemoryModuleStore::<TravelOrder>::new()),
    Arc::new(MemoryModuleStore::<PaymentBill>::new()),
  );
  (ledger, modules)
}

fn cart(lines: usize) -> ShopCheckout {
  ShopCheckout {
    items: (0..lines)
      .map(|i| CartItem {
        product_id: Some(i as i64 + 1),
        name: Some(format!("product_{}", i)),
        unit_price_cents: Some(1_000 + i as i64),
        quantity: Some(2),
      })
      .collect(),
    shipping_name: None,
    shipping_phone: None,
    shipping_address: None,
  }
}

fn bench_workflow_overhead(c: &mut Criterion) {
  let mut group = c.benchmark_group("WorkflowOverhead");
  let rt = Runtime::new().unwrap();

  for num_steps in [1usize, 5, 10] {
    let names: Vec<String> = (0..num_steps).map(|i| format!("step_{}", i)).collect();
    let defs: Vec<(&str, bool)> = names.iter().map(|n| (n.as_str(), false)).collect();
    let mut workflow = Workflow::<u64, xihu_core::LedgerError>::new("bench", &defs);
    for name in &names {
      workflow.on_step(name, |ctx: ContextData<u64>| async move {
        *ctx.write() += 1;
        Ok::<_, xihu_core::LedgerError>(StepControl::Continue)
      });
    }

    group.throughput(Throughput::Elements(num_steps as u64));
    group.bench_with_input(BenchmarkId::from_parameter(num_steps), &num_steps, |b, _| {
      b.to_async(&rt).iter(|| async {
        workflow.run(ContextData::new(0u64)).await.unwrap();
      });
    });
  }
  group.finish();
}

fn bench_shop_placement(c: &mut Criterion) {
  let mut group = c.benchmark_group("ShopPlacement");
  let rt = Runtime::new().unwrap();
  let (ledger, modules) = registry();
  let placement = OrderPlacement::new(modules.shop.clone(), ledger);

  for lines in [1usize, 10, 50] {
    group.throughput(Throughput::Elements(lines as u64));
    group.bench_with_input(BenchmarkId::from_parameter(lines), &lines, |b, &lines| {
      b.to_async(&rt).iter(|| async { placement.place(1, cart(lines)).await.unwrap() });
    });
  }
  group.finish();
}

fn bench_place_and_pay(c: &mut Criterion) {
  let rt = Runtime::new().unwrap();
  let (ledger, modules) = registry();
  let placement = OrderPlacement::new(modules.travel.clone(), ledger.clone());
  let checkout = CheckoutService::new(ledger, modules);

  c.bench_function("TravelPlaceAndPay", |b| {
    b.to_async(&rt).iter(|| async {
      let placed = placement
        .place(
          1,
          TicketBooking {
            attraction_id: 1,
            attraction_name: "Leifeng Pagoda".to_string(),
            visit_date: chrono::NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            ticket_count: 2,
            ticket_price_cents: 8_000,
            contact_name: None,
            contact_phone: None,
          },
        )
        .await
        .unwrap();
      checkout.process_payment(&placed.order_no, 1, "alipay").await.unwrap();
    });
  });
}

criterion_group!(benches, bench_workflow_overhead, bench_shop_placement, bench_place_and_pay);
criterion_main!(benches);
