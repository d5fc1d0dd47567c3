// xihu_core/src/store.rs

//! Storage seams. The server provides Postgres implementations; `crate::memory`
//! provides in-process ones for tests and the `memory` backend.

use crate::error::LedgerResult;
use crate::model::{
  LedgerFilter, ModuleOrder, ModuleOrderRef, ModuleTransition, NewLedgerEntry, OrderStats, UnifiedOrder,
};
use crate::rating::{NewReview, Review, ReviewTarget};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait LedgerStore: Send + Sync {
  /// Inserts a new `Unpaid` row. Fails with `Persistence` if nothing was written
  /// (e.g. a duplicate order number).
  async fn insert(&self, entry: NewLedgerEntry) -> LedgerResult<UnifiedOrder>;

  async fn find_by_order_no(&self, order_no: &str) -> LedgerResult<Option<UnifiedOrder>>;

  /// The user's rows matching `filter`, newest first.
  async fn list_for_user(&self, user_id: i64, filter: &LedgerFilter) -> LedgerResult<Vec<UnifiedOrder>>;

  /// Newest `Unpaid` row pointing at `module_ref`, if any.
  async fn find_unpaid_for_module(&self, module_ref: ModuleOrderRef) -> LedgerResult<Option<UnifiedOrder>>;

  /// `Unpaid -> Paid`. Returns `false` when the row was not `Unpaid`.
  async fn mark_paid(&self, order_no: &str, payment_method: &str, paid_at: DateTime<Utc>) -> LedgerResult<bool>;

  /// `Unpaid -> Cancelled`. Returns `false` when the row was not `Unpaid`.
  async fn cancel(&self, order_no: &str) -> LedgerResult<bool>;

  /// Removes a `Cancelled` row owned by `user_id`. Returns `false` otherwise.
  async fn delete_cancelled(&self, order_no: &str, user_id: i64) -> LedgerResult<bool>;

  async fn stats_for_user(&self, user_id: i64) -> LedgerResult<OrderStats>;
}

/// Storage for one module's orders.
#[async_trait]
pub trait ModuleOrderStore<O: ModuleOrder>: Send + Sync {
  /// Persists `order` (and its line items). Returns it with the assigned id.
  async fn insert(&self, order: O) -> LedgerResult<O>;

  async fn find(&self, id: i64) -> LedgerResult<Option<O>>;

  /// Writes the back-link. Returns `false` if no such order exists.
  async fn set_unified_order_no(&self, id: i64, order_no: &str) -> LedgerResult<bool>;

  /// Returns `false` when the order is missing or its status forbids the move.
  async fn transition(&self, id: i64, transition: ModuleTransition, at: DateTime<Utc>) -> LedgerResult<bool>;
}

#[async_trait]
pub trait ReviewStore: Send + Sync {
  async fn insert_review(&self, review: NewReview) -> LedgerResult<Review>;

  async fn list_reviews(&self, target: ReviewTarget) -> LedgerResult<Vec<Review>>;

  /// Every rating recorded for `target`.
  async fn ratings_for(&self, target: ReviewTarget) -> LedgerResult<Vec<f64>>;

  /// Writes the aggregate score onto the hotel or restaurant. `false` if it does not exist.
  async fn update_score(&self, target: ReviewTarget, score: f64) -> LedgerResult<bool>;
}
