// server/src/web/handlers/mod.rs
pub mod auth_handlers;
pub mod bill_handlers;
pub mod food_handlers;
pub mod hotel_handlers;
pub mod review_handlers;
pub mod shop_handlers;
pub mod travel_handlers;
pub mod unified_handlers;

use xihu_core::model::ModuleOrder;
use xihu_core::{LedgerError, LedgerResult, OrderModule};

/// Loads a module order and checks it belongs to `user_id`.
pub(crate) async fn owned_module_order<M: OrderModule>(module: &M, id: i64, user_id: i64) -> LedgerResult<M::Order> {
  let entity = module.order_type().as_str();
  let order = module
    .find(id)
    .await?
    .ok_or_else(|| LedgerError::not_found("module order", format!("{} #{}", entity, id)))?;
  if order.user_id() != user_id {
    return Err(LedgerError::forbidden("module order", format!("{} #{}", entity, id)));
  }
  Ok(order)
}
