// xihu_core/src/memory.rs

//! In-process stores backed by `parking_lot` locks. Every guarded write checks
//! and updates under one lock, so the compare-and-swap semantics of the SQL
//! stores hold here too.

use crate::error::{LedgerError, LedgerResult};
use crate::model::{
  BillStatus, LedgerFilter, ModuleOrder, ModuleOrderRef, ModuleTransition, NewLedgerEntry, OrderStats, PaymentStatus,
  UnifiedOrder,
};
use crate::modules::{OverdueBills, PaymentBill};
use crate::rating::{NewReview, Review, ReviewTarget};
use crate::store::{LedgerStore, ModuleOrderStore, ReviewStore};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default)]
struct LedgerRows {
  next_id: i64,
  rows: Vec<UnifiedOrder>,
}

#[derive(Debug, Default)]
pub struct MemoryLedger {
  inner: Mutex<LedgerRows>,
}

impl MemoryLedger {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.inner.lock().rows.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
  async fn insert(&self, entry: NewLedgerEntry) -> LedgerResult<UnifiedOrder> {
    let mut inner = self.inner.lock();
    if inner.rows.iter().any(|r| r.order_no == entry.order_no) {
      return Err(LedgerError::Persistence(format!(
        "duplicate order number {}",
        entry.order_no
      )));
    }
    inner.next_id += 1;
    let now = Utc::now();
    let order = UnifiedOrder {
      id: inner.next_id,
      order_no: entry.order_no,
      user_id: entry.user_id,
      order_type: entry.order_type,
      module_ref: entry.module_ref,
      title: entry.title,
      description: entry.description,
      total_amount_cents: entry.total_amount_cents,
      payment_status: PaymentStatus::Unpaid,
      payment_method: None,
      payment_time: None,
      created_at: now,
      updated_at: now,
    };
    inner.rows.push(order.clone());
    Ok(order)
  }

  async fn find_by_order_no(&self, order_no: &str) -> LedgerResult<Option<UnifiedOrder>> {
    Ok(self.inner.lock().rows.iter().find(|r| r.order_no == order_no).cloned())
  }

  async fn list_for_user(&self, user_id: i64, filter: &LedgerFilter) -> LedgerResult<Vec<UnifiedOrder>> {
    let inner = self.inner.lock();
    // Newest first; ties on created_at fall back to insertion order.
    Ok(
      inner
        .rows
        .iter()
        .rev()
        .filter(|r| r.user_id == user_id && filter.matches(r))
        .cloned()
        .collect(),
    )
  }

  async fn find_unpaid_for_module(&self, module_ref: ModuleOrderRef) -> LedgerResult<Option<UnifiedOrder>> {
    let inner = self.inner.lock();
    Ok(
      inner
        .rows
        .iter()
        .rev()
        .find(|r| r.module_ref == Some(module_ref) && r.payment_status == PaymentStatus::Unpaid)
        .cloned(),
    )
  }

  async fn mark_paid(&self, order_no: &str, payment_method: &str, paid_at: DateTime<Utc>) -> LedgerResult<bool> {
    let mut inner = self.inner.lock();
    match inner
      .rows
      .iter_mut()
      .find(|r| r.order_no == order_no && r.payment_status.can_pay())
    {
      Some(row) => {
        row.payment_status = PaymentStatus::Paid;
        row.payment_method = Some(payment_method.to_string());
        row.payment_time = Some(paid_at);
        row.updated_at = paid_at;
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn cancel(&self, order_no: &str) -> LedgerResult<bool> {
    let mut inner = self.inner.lock();
    match inner
      .rows
      .iter_mut()
      .find(|r| r.order_no == order_no && r.payment_status.can_cancel())
    {
      Some(row) => {
        row.payment_status = PaymentStatus::Cancelled;
        row.updated_at = Utc::now();
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn delete_cancelled(&self, order_no: &str, user_id: i64) -> LedgerResult<bool> {
    let mut inner = self.inner.lock();
    let before = inner.rows.len();
    inner
      .rows
      .retain(|r| !(r.order_no == order_no && r.user_id == user_id && r.payment_status.can_delete()));
    Ok(inner.rows.len() < before)
  }

  async fn stats_for_user(&self, user_id: i64) -> LedgerResult<OrderStats> {
    let inner = self.inner.lock();
    Ok(OrderStats::tally(inner.rows.iter().filter(|r| r.user_id == user_id)))
  }
}

/// One generic store for any module's orders.
pub struct MemoryModuleStore<O: ModuleOrder> {
  rows: RwLock<BTreeMap<i64, O>>,
  next_id: Mutex<i64>,
}

impl<O: ModuleOrder> Default for MemoryModuleStore<O> {
  fn default() -> Self {
    Self {
      rows: RwLock::new(BTreeMap::new()),
      next_id: Mutex::new(0),
    }
  }
}

impl<O: ModuleOrder> MemoryModuleStore<O> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn len(&self) -> usize {
    self.rows.read().len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// Synchronous lookup for tests and seeding code.
  pub fn get(&self, id: i64) -> Option<O> {
    self.rows.read().get(&id).cloned()
  }
}

#[async_trait]
impl<O: ModuleOrder> ModuleOrderStore<O> for MemoryModuleStore<O> {
  async fn insert(&self, mut order: O) -> LedgerResult<O> {
    let id = {
      let mut next_id = self.next_id.lock();
      *next_id += 1;
      *next_id
    };
    order.assign_id(id);
    self.rows.write().insert(id, order.clone());
    Ok(order)
  }

  async fn find(&self, id: i64) -> LedgerResult<Option<O>> {
    Ok(self.get(id))
  }

  async fn set_unified_order_no(&self, id: i64, order_no: &str) -> LedgerResult<bool> {
    match self.rows.write().get_mut(&id) {
      Some(order) => {
        order.set_unified_order_no(order_no);
        Ok(true)
      }
      None => Ok(false),
    }
  }

  async fn transition(&self, id: i64, transition: ModuleTransition, at: DateTime<Utc>) -> LedgerResult<bool> {
    Ok(
      self
        .rows
        .write()
        .get_mut(&id)
        .map_or(false, |order| order.apply_transition(transition, at)),
    )
  }
}

#[async_trait]
impl OverdueBills for MemoryModuleStore<PaymentBill> {
  async fn mark_overdue(&self, today: NaiveDate) -> LedgerResult<u64> {
    let mut rows = self.rows.write();
    let mut changed = 0;
    for bill in rows.values_mut().filter(|b| b.is_overdue(today)) {
      bill.status = BillStatus::Overdue;
      changed += 1;
    }
    Ok(changed)
  }
}

#[derive(Debug, Default)]
pub struct MemoryReviews {
  reviews: RwLock<Vec<Review>>,
  /// Targets that exist, with their current score (`None` until first review).
  scores: RwLock<HashMap<ReviewTarget, Option<f64>>>,
}

impl MemoryReviews {
  pub fn new() -> Self {
    Self::default()
  }

  /// Makes `target` known so scores can be written to it.
  pub fn register_target(&self, target: ReviewTarget) {
    self.scores.write().entry(target).or_insert(None);
  }

  pub fn score(&self, target: ReviewTarget) -> Option<f64> {
    self.scores.read().get(&target).copied().flatten()
  }
}

#[async_trait]
impl ReviewStore for MemoryReviews {
  async fn insert_review(&self, review: NewReview) -> LedgerResult<Review> {
    let mut reviews = self.reviews.write();
    let stored = Review {
      id: reviews.len() as i64 + 1,
      target: review.target,
      user_id: review.user_id,
      username: review.username,
      rating: review.rating,
      content: review.content,
      created_at: Utc::now(),
    };
    reviews.push(stored.clone());
    Ok(stored)
  }

  async fn list_reviews(&self, target: ReviewTarget) -> LedgerResult<Vec<Review>> {
    Ok(
      self
        .reviews
        .read()
        .iter()
        .rev()
        .filter(|r| r.target == target)
        .cloned()
        .collect(),
    )
  }

  async fn ratings_for(&self, target: ReviewTarget) -> LedgerResult<Vec<f64>> {
    Ok(
      self
        .reviews
        .read()
        .iter()
        .filter(|r| r.target == target)
        .map(|r| r.rating)
        .collect(),
    )
  }

  async fn update_score(&self, target: ReviewTarget, score: f64) -> LedgerResult<bool> {
    match self.scores.write().get_mut(&target) {
      Some(slot) => {
        *slot = Some(score);
        Ok(true)
      }
      None => Ok(false),
    }
  }
}
