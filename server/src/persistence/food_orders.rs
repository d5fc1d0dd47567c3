// server/src/persistence/food_orders.rs

use super::{decode_status, storage_err, transition_module_row, write_back_link};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use xihu_core::model::{FoodOrderLine, ModuleStatus, ModuleTransition};
use xihu_core::modules::RestaurantOrder;
use xihu_core::{LedgerResult, ModuleOrderStore};

#[derive(Debug, FromRow)]
struct RestaurantOrderRow {
  id: i64,
  unified_order_no: Option<String>,
  user_id: i64,
  restaurant_id: i64,
  restaurant_name: String,
  total_amount_cents: i64,
  status: i16,
  contact_name: Option<String>,
  contact_phone: Option<String>,
  special_requirements: Option<String>,
  people_count: i32,
  created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct FoodLineRow {
  menu_id: i64,
  menu_name: String,
  unit_price_cents: i64,
  quantity: i32,
  subtotal_cents: i64,
}

impl From<FoodLineRow> for FoodOrderLine {
  fn from(row: FoodLineRow) -> Self {
    FoodOrderLine {
      menu_id: row.menu_id,
      menu_name: row.menu_name,
      unit_price_cents: row.unit_price_cents,
      quantity: row.quantity,
      subtotal_cents: row.subtotal_cents,
    }
  }
}

pub struct PgFoodOrders {
  pool: PgPool,
}

impl PgFoodOrders {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl ModuleOrderStore<RestaurantOrder> for PgFoodOrders {
  async fn insert(&self, mut order: RestaurantOrder) -> LedgerResult<RestaurantOrder> {
    let mut tx = self.pool.begin().await.map_err(storage_err)?;

    let id: i64 = sqlx::query_scalar(
      "INSERT INTO restaurant_order (user_id, restaurant_id, restaurant_name, total_amount_cents, status,
         contact_name, contact_phone, special_requirements, people_count, created_at, updated_at)
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
       RETURNING id",
    )
    .bind(order.user_id)
    .bind(order.restaurant_id)
    .bind(&order.restaurant_name)
    .bind(order.total_amount_cents)
    .bind(order.status.code())
    .bind(&order.contact_name)
    .bind(&order.contact_phone)
    .bind(&order.special_requirements)
    .bind(order.people_count)
    .bind(order.created_at)
    .fetch_one(&mut *tx)
    .await
    .map_err(storage_err)?;

    for line in &order.lines {
      sqlx::query(
        "INSERT INTO restaurant_order_item (restaurant_order_id, menu_id, menu_name, unit_price_cents, quantity,
           subtotal_cents)
         VALUES ($1, $2, $3, $4, $5, $6)",
      )
      .bind(id)
      .bind(line.menu_id)
      .bind(&line.menu_name)
      .bind(line.unit_price_cents)
      .bind(line.quantity)
      .bind(line.subtotal_cents)
      .execute(&mut *tx)
      .await
      .map_err(storage_err)?;
    }

    tx.commit().await.map_err(storage_err)?;
    tracing::debug!(restaurant_order_id = id, lines = order.lines.len(), "Takeout order stored.");

    order.id = id;
    Ok(order)
  }

  async fn find(&self, id: i64) -> LedgerResult<Option<RestaurantOrder>> {
    let row: Option<RestaurantOrderRow> = sqlx::query_as(
      "SELECT id, unified_order_no, user_id, restaurant_id, restaurant_name, total_amount_cents, status,
              contact_name, contact_phone, special_requirements, people_count, created_at
       FROM restaurant_order WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await
    .map_err(storage_err)?;

    let Some(row) = row else {
      return Ok(None);
    };

    let lines: Vec<FoodLineRow> = sqlx::query_as(
      "SELECT menu_id, menu_name, unit_price_cents, quantity, subtotal_cents
       FROM restaurant_order_item WHERE restaurant_order_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(&self.pool)
    .await
    .map_err(storage_err)?;

    Ok(Some(RestaurantOrder {
      id: row.id,
      unified_order_no: row.unified_order_no,
      user_id: row.user_id,
      restaurant_id: row.restaurant_id,
      restaurant_name: row.restaurant_name,
      total_amount_cents: row.total_amount_cents,
      status: decode_status(row.status, ModuleStatus::from_code)?,
      contact_name: row.contact_name,
      contact_phone: row.contact_phone,
      special_requirements: row.special_requirements,
      people_count: row.people_count,
      created_at: row.created_at,
      lines: lines.into_iter().map(FoodOrderLine::from).collect(),
    }))
  }

  async fn set_unified_order_no(&self, id: i64, order_no: &str) -> LedgerResult<bool> {
    write_back_link(&self.pool, "restaurant_order", id, order_no).await
  }

  async fn transition(&self, id: i64, transition: ModuleTransition, at: DateTime<Utc>) -> LedgerResult<bool> {
    transition_module_row(&self.pool, "restaurant_order", None, id, transition, at).await
  }
}
