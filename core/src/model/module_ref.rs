// xihu_core/src/model/module_ref.rs
use super::OrderType;
use serde::Serialize;

/// Points from a ledger row to the module order it stands for.
///
/// The variant is the module, so a reference can never name a hotel id while
/// claiming to be a food order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "type", content = "id", rename_all = "UPPERCASE")]
pub enum ModuleOrderRef {
  Food(i64),
  Hotel(i64),
  Shopping(i64),
  Travel(i64),
  Payment(i64),
}

impl ModuleOrderRef {
  pub fn new(order_type: OrderType, id: i64) -> Self {
    match order_type {
      OrderType::Food => ModuleOrderRef::Food(id),
      OrderType::Hotel => ModuleOrderRef::Hotel(id),
      OrderType::Shopping => ModuleOrderRef::Shopping(id),
      OrderType::Travel => ModuleOrderRef::Travel(id),
      OrderType::Payment => ModuleOrderRef::Payment(id),
    }
  }

  /// Rebuilds a reference from the `(order_type, module_order_id)` column pair.
  pub fn from_columns(order_type: OrderType, id: Option<i64>) -> Option<Self> {
    id.map(|id| Self::new(order_type, id))
  }

  pub fn order_type(&self) -> OrderType {
    match self {
      ModuleOrderRef::Food(_) => OrderType::Food,
      ModuleOrderRef::Hotel(_) => OrderType::Hotel,
      ModuleOrderRef::Shopping(_) => OrderType::Shopping,
      ModuleOrderRef::Travel(_) => OrderType::Travel,
      ModuleOrderRef::Payment(_) => OrderType::Payment,
    }
  }

  pub fn id(&self) -> i64 {
    match *self {
      ModuleOrderRef::Food(id)
      | ModuleOrderRef::Hotel(id)
      | ModuleOrderRef::Shopping(id)
      | ModuleOrderRef::Travel(id)
      | ModuleOrderRef::Payment(id) => id,
    }
  }
}
