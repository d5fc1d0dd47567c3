// server/src/persistence/mod.rs

//! Postgres implementations of the storage traits, using runtime `sqlx` queries.

pub mod bills;
pub mod food_orders;
pub mod hotel_orders;
pub mod ledger;
pub mod reviews;
pub mod shop_orders;
pub mod travel_orders;
pub mod users;

pub use bills::PgBills;
pub use food_orders::PgFoodOrders;
pub use hotel_orders::PgHotelOrders;
pub use ledger::PgLedger;
pub use reviews::PgReviews;
pub use shop_orders::PgShopOrders;
pub use travel_orders::PgTravelOrders;
pub use users::{MemoryUsers, NewUser, PgUsers, User, UserStore};

use xihu_core::LedgerError;

pub(crate) fn storage_err(err: sqlx::Error) -> LedgerError {
  tracing::error!(error = %err, "Database operation failed.");
  LedgerError::from(anyhow::Error::new(err))
}

/// Status code column to enum, surfacing bad data as a storage error.
pub(crate) fn decode_status<T>(code: i16, parse: fn(i16) -> Result<T, LedgerError>) -> Result<T, LedgerError> {
  parse(code).map_err(|e| LedgerError::from(anyhow::anyhow!("corrupt status column: {}", e)))
}

/// Status move shared by the module tables (`status` column: 0 pending, 1 paid, 2 cancelled).
/// `paid_column` is stamped with `at` on confirm when the table records a payment time.
pub(crate) async fn transition_module_row(
  pool: &sqlx::PgPool,
  table: &'static str,
  paid_column: Option<&'static str>,
  id: i64,
  transition: xihu_core::model::ModuleTransition,
  at: chrono::DateTime<chrono::Utc>,
) -> Result<bool, LedgerError> {
  use xihu_core::model::ModuleTransition;

  let sql = match (transition, paid_column) {
    (ModuleTransition::Confirm, Some(column)) => format!(
      "UPDATE {} SET status = 1, {} = $2, updated_at = $2 WHERE id = $1 AND status = 0",
      table, column
    ),
    (ModuleTransition::Confirm, None) => format!(
      "UPDATE {} SET status = 1, updated_at = $2 WHERE id = $1 AND status = 0",
      table
    ),
    (ModuleTransition::Cancel, _) => format!(
      "UPDATE {} SET status = 2, updated_at = $2 WHERE id = $1 AND status = 0",
      table
    ),
  };
  let result = sqlx::query(&sql)
    .bind(id)
    .bind(at)
    .execute(pool)
    .await
    .map_err(storage_err)?;
  Ok(result.rows_affected() > 0)
}

pub(crate) async fn write_back_link(
  pool: &sqlx::PgPool,
  table: &'static str,
  id: i64,
  order_no: &str,
) -> Result<bool, LedgerError> {
  let sql = format!("UPDATE {} SET unified_order_no = $2, updated_at = NOW() WHERE id = $1", table);
  let result = sqlx::query(&sql)
    .bind(id)
    .bind(order_no)
    .execute(pool)
    .await
    .map_err(storage_err)?;
  Ok(result.rows_affected() > 0)
}
