// server/src/persistence/shop_orders.rs

use super::{decode_status, storage_err, transition_module_row, write_back_link};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use xihu_core::model::{ModuleStatus, ModuleTransition, ShopOrderLine};
use xihu_core::modules::ShopOrder;
use xihu_core::{LedgerResult, ModuleOrderStore};

#[derive(Debug, FromRow)]
struct ShopOrderRow {
  id: i64,
  order_no: String,
  unified_order_no: Option<String>,
  user_id: i64,
  total_amount_cents: i64,
  status: i16,
  shipping_name: Option<String>,
  shipping_phone: Option<String>,
  shipping_address: Option<String>,
  payment_time: Option<DateTime<Utc>>,
  created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct ShopLineRow {
  product_id: i64,
  product_name: String,
  unit_price_cents: i64,
  quantity: i32,
  subtotal_cents: i64,
}

pub struct PgShopOrders {
  pool: PgPool,
}

impl PgShopOrders {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl ModuleOrderStore<ShopOrder> for PgShopOrders {
  async fn insert(&self, mut order: ShopOrder) -> LedgerResult<ShopOrder> {
    let mut tx = self.pool.begin().await.map_err(storage_err)?;

    let id: i64 = sqlx::query_scalar(
      "INSERT INTO shop_order (order_no, user_id, total_amount_cents, status, shipping_name, shipping_phone,
         shipping_address, created_at, updated_at)
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
       RETURNING id",
    )
    .bind(&order.order_no)
    .bind(order.user_id)
    .bind(order.total_amount_cents)
    .bind(order.status.code())
    .bind(&order.shipping_name)
    .bind(&order.shipping_phone)
    .bind(&order.shipping_address)
    .bind(order.created_at)
    .fetch_one(&mut *tx)
    .await
    .map_err(storage_err)?;

    for line in &order.lines {
      sqlx::query(
        "INSERT INTO shop_order_item (shop_order_id, product_id, product_name, unit_price_cents, quantity,
           subtotal_cents)
         VALUES ($1, $2, $3, $4, $5, $6)",
      )
      .bind(id)
      .bind(line.product_id)
      .bind(&line.product_name)
      .bind(line.unit_price_cents)
      .bind(line.quantity)
      .bind(line.subtotal_cents)
      .execute(&mut *tx)
      .await
      .map_err(storage_err)?;
    }

    tx.commit().await.map_err(storage_err)?;

    order.id = id;
    Ok(order)
  }

  async fn find(&self, id: i64) -> LedgerResult<Option<ShopOrder>> {
    let row: Option<ShopOrderRow> = sqlx::query_as(
      "SELECT id, order_no, unified_order_no, user_id, total_amount_cents, status, shipping_name,
              shipping_phone, shipping_address, payment_time, created_at
       FROM shop_order WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await
    .map_err(storage_err)?;

    let Some(row) = row else {
      return Ok(None);
    };

    let lines: Vec<ShopLineRow> = sqlx::query_as(
      "SELECT product_id, product_name, unit_price_cents, quantity, subtotal_cents
       FROM shop_order_item WHERE shop_order_id = $1 ORDER BY id",
    )
    .bind(id)
    .fetch_all(&self.pool)
    .await
    .map_err(storage_err)?;

    Ok(Some(ShopOrder {
      id: row.id,
      order_no: row.order_no,
      unified_order_no: row.unified_order_no,
      user_id: row.user_id,
      total_amount_cents: row.total_amount_cents,
      status: decode_status(row.status, ModuleStatus::from_code)?,
      shipping_name: row.shipping_name,
      shipping_phone: row.shipping_phone,
      shipping_address: row.shipping_address,
      payment_time: row.payment_time,
      created_at: row.created_at,
      lines: lines
        .into_iter()
        .map(|l| ShopOrderLine {
          product_id: l.product_id,
          product_name: l.product_name,
          unit_price_cents: l.unit_price_cents,
          quantity: l.quantity,
          subtotal_cents: l.subtotal_cents,
        })
        .collect(),
    }))
  }

  async fn set_unified_order_no(&self, id: i64, order_no: &str) -> LedgerResult<bool> {
    write_back_link(&self.pool, "shop_order", id, order_no).await
  }

  async fn transition(&self, id: i64, transition: ModuleTransition, at: DateTime<Utc>) -> LedgerResult<bool> {
    transition_module_row(&self.pool, "shop_order", Some("payment_time"), id, transition, at).await
  }
}
