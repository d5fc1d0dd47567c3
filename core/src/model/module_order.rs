// xihu_core/src/model/module_order.rs
use super::{LineItems, ModuleTransition, OrderType};
use chrono::{DateTime, Utc};

/// Behaviour shared by every module's order record, so one generic store and
/// one placement workflow can serve all five modules.
pub trait ModuleOrder: Clone + Send + Sync + 'static {
  const ORDER_TYPE: OrderType;

  fn id(&self) -> i64;
  /// Called by stores once the row has an identity.
  fn assign_id(&mut self, id: i64);
  fn user_id(&self) -> i64;
  fn total_amount_cents(&self) -> i64;

  /// The module's own order number, when it has one.
  fn module_order_no(&self) -> Option<&str> {
    None
  }

  fn unified_order_no(&self) -> Option<&str>;
  fn set_unified_order_no(&mut self, order_no: &str);

  /// Applies `transition` in place. Returns `false` (leaving the record untouched)
  /// when the current status does not allow it.
  fn apply_transition(&mut self, transition: ModuleTransition, at: DateTime<Utc>) -> bool;

  fn line_items(&self) -> Option<LineItems> {
    None
  }
}
