// server/src/persistence/travel_orders.rs

use super::{decode_status, storage_err, transition_module_row, write_back_link};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use xihu_core::model::{ModuleStatus, ModuleTransition};
use xihu_core::modules::TravelOrder;
use xihu_core::{LedgerResult, ModuleOrderStore};

#[derive(Debug, FromRow)]
struct TravelOrderRow {
  id: i64,
  order_no: String,
  unified_order_no: Option<String>,
  user_id: i64,
  attraction_id: i64,
  attraction_name: String,
  visit_date: NaiveDate,
  ticket_count: i32,
  ticket_price_cents: i64,
  total_amount_cents: i64,
  contact_name: Option<String>,
  contact_phone: Option<String>,
  status: i16,
  payment_time: Option<DateTime<Utc>>,
  created_at: DateTime<Utc>,
}

impl TryFrom<TravelOrderRow> for TravelOrder {
  type Error = xihu_core::LedgerError;

  fn try_from(row: TravelOrderRow) -> Result<Self, Self::Error> {
    Ok(TravelOrder {
      id: row.id,
      order_no: row.order_no,
      unified_order_no: row.unified_order_no,
      user_id: row.user_id,
      attraction_id: row.attraction_id,
      attraction_name: row.attraction_name,
      visit_date: row.visit_date,
      ticket_count: row.ticket_count,
      ticket_price_cents: row.ticket_price_cents,
      total_amount_cents: row.total_amount_cents,
      contact_name: row.contact_name,
      contact_phone: row.contact_phone,
      status: decode_status(row.status, ModuleStatus::from_code)?,
      payment_time: row.payment_time,
      created_at: row.created_at,
    })
  }
}

pub struct PgTravelOrders {
  pool: PgPool,
}

impl PgTravelOrders {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl ModuleOrderStore<TravelOrder> for PgTravelOrders {
  async fn insert(&self, mut order: TravelOrder) -> LedgerResult<TravelOrder> {
    let id: i64 = sqlx::query_scalar(
      "INSERT INTO travel_order (order_no, user_id, attraction_id, attraction_name, visit_date, ticket_count,
         ticket_price_cents, total_amount_cents, contact_name, contact_phone, status, created_at, updated_at)
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
       RETURNING id",
    )
    .bind(&order.order_no)
    .bind(order.user_id)
    .bind(order.attraction_id)
    .bind(&order.attraction_name)
    .bind(order.visit_date)
    .bind(order.ticket_count)
    .bind(order.ticket_price_cents)
    .bind(order.total_amount_cents)
    .bind(&order.contact_name)
    .bind(&order.contact_phone)
    .bind(order.status.code())
    .bind(order.created_at)
    .fetch_one(&self.pool)
    .await
    .map_err(storage_err)?;

    order.id = id;
    Ok(order)
  }

  async fn find(&self, id: i64) -> LedgerResult<Option<TravelOrder>> {
    let row: Option<TravelOrderRow> = sqlx::query_as(
      "SELECT id, order_no, unified_order_no, user_id, attraction_id, attraction_name, visit_date, ticket_count,
              ticket_price_cents, total_amount_cents, contact_name, contact_phone, status, payment_time, created_at
       FROM travel_order WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await
    .map_err(storage_err)?;
    row.map(TravelOrder::try_from).transpose()
  }

  async fn set_unified_order_no(&self, id: i64, order_no: &str) -> LedgerResult<bool> {
    write_back_link(&self.pool, "travel_order", id, order_no).await
  }

  async fn transition(&self, id: i64, transition: ModuleTransition, at: DateTime<Utc>) -> LedgerResult<bool> {
    transition_module_row(&self.pool, "travel_order", Some("payment_time"), id, transition, at).await
  }
}
