// server/src/persistence/hotel_orders.rs

use super::{decode_status, storage_err, transition_module_row, write_back_link};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use xihu_core::model::{HotelStayDetail, ModuleStatus, ModuleTransition};
use xihu_core::modules::HotelOrder;
use xihu_core::{LedgerResult, ModuleOrderStore};

#[derive(Debug, FromRow)]
struct HotelOrderRow {
  id: i64,
  order_no: String,
  unified_order_no: Option<String>,
  user_id: i64,
  hotel_id: i64,
  room_id: i64,
  room_name: String,
  check_in: NaiveDate,
  check_out: NaiveDate,
  guests: i32,
  contact_name: String,
  contact_phone: String,
  notes: Option<String>,
  total_price_cents: i64,
  status: i16,
  created_at: DateTime<Utc>,
  // detail columns
  hotel_name: String,
  room_type: String,
  nights: i64,
  detail_guests: i32,
  room_price_cents: i64,
  subtotal_cents: i64,
}

impl HotelOrderRow {
  fn into_order(self) -> LedgerResult<HotelOrder> {
    let stay = HotelStayDetail {
      order_no: self.order_no.clone(),
      hotel_id: self.hotel_id,
      hotel_name: self.hotel_name,
      room_type: self.room_type,
      check_in: self.check_in,
      check_out: self.check_out,
      nights: self.nights,
      guests: self.detail_guests,
      room_price_cents: self.room_price_cents,
      subtotal_cents: self.subtotal_cents,
    };
    Ok(HotelOrder {
      id: self.id,
      order_no: self.order_no,
      unified_order_no: self.unified_order_no,
      user_id: self.user_id,
      hotel_id: self.hotel_id,
      room_id: self.room_id,
      room_name: self.room_name,
      check_in: self.check_in,
      check_out: self.check_out,
      guests: self.guests,
      contact_name: self.contact_name,
      contact_phone: self.contact_phone,
      notes: self.notes,
      total_price_cents: self.total_price_cents,
      status: decode_status(self.status, ModuleStatus::from_code)?,
      created_at: self.created_at,
      stay,
    })
  }
}

pub struct PgHotelOrders {
  pool: PgPool,
}

impl PgHotelOrders {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl ModuleOrderStore<HotelOrder> for PgHotelOrders {
  async fn insert(&self, mut order: HotelOrder) -> LedgerResult<HotelOrder> {
    let mut tx = self.pool.begin().await.map_err(storage_err)?;

    let id: i64 = sqlx::query_scalar(
      "INSERT INTO hotel_order (order_no, user_id, hotel_id, room_id, room_name, check_in, check_out, guests,
         contact_name, contact_phone, notes, total_price_cents, status, created_at, updated_at)
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $14)
       RETURNING id",
    )
    .bind(&order.order_no)
    .bind(order.user_id)
    .bind(order.hotel_id)
    .bind(order.room_id)
    .bind(&order.room_name)
    .bind(order.check_in)
    .bind(order.check_out)
    .bind(order.guests)
    .bind(&order.contact_name)
    .bind(&order.contact_phone)
    .bind(&order.notes)
    .bind(order.total_price_cents)
    .bind(order.status.code())
    .bind(order.created_at)
    .fetch_one(&mut *tx)
    .await
    .map_err(storage_err)?;

    let stay = &order.stay;
    sqlx::query(
      "INSERT INTO hotel_order_detail (hotel_order_id, order_no, hotel_id, hotel_name, room_type, check_in,
         check_out, nights, guests, room_price_cents, subtotal_cents)
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
    )
    .bind(id)
    .bind(&stay.order_no)
    .bind(stay.hotel_id)
    .bind(&stay.hotel_name)
    .bind(&stay.room_type)
    .bind(stay.check_in)
    .bind(stay.check_out)
    .bind(stay.nights)
    .bind(stay.guests)
    .bind(stay.room_price_cents)
    .bind(stay.subtotal_cents)
    .execute(&mut *tx)
    .await
    .map_err(storage_err)?;

    tx.commit().await.map_err(storage_err)?;
    tracing::debug!(hotel_order_id = id, order_no = %order.order_no, "Hotel order stored.");

    order.id = id;
    Ok(order)
  }

  async fn find(&self, id: i64) -> LedgerResult<Option<HotelOrder>> {
    let row: Option<HotelOrderRow> = sqlx::query_as(
      "SELECT o.id, o.order_no, o.unified_order_no, o.user_id, o.hotel_id, o.room_id, o.room_name,
              o.check_in, o.check_out, o.guests, o.contact_name, o.contact_phone, o.notes,
              o.total_price_cents, o.status, o.created_at,
              d.hotel_name, d.room_type, d.nights, d.guests AS detail_guests, d.room_price_cents, d.subtotal_cents
       FROM hotel_order o
       JOIN hotel_order_detail d ON d.hotel_order_id = o.id
       WHERE o.id = $1",
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await
    .map_err(storage_err)?;
    row.map(HotelOrderRow::into_order).transpose()
  }

  async fn set_unified_order_no(&self, id: i64, order_no: &str) -> LedgerResult<bool> {
    write_back_link(&self.pool, "hotel_order", id, order_no).await
  }

  async fn transition(&self, id: i64, transition: ModuleTransition, at: DateTime<Utc>) -> LedgerResult<bool> {
    transition_module_row(&self.pool, "hotel_order", None, id, transition, at).await
  }
}
