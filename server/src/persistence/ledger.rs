// server/src/persistence/ledger.rs

use super::{decode_status, storage_err};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use xihu_core::model::{LedgerFilter, ModuleOrderRef, NewLedgerEntry, OrderStats, OrderType, PaymentStatus, UnifiedOrder};
use xihu_core::{LedgerError, LedgerResult, LedgerStore};

const LEDGER_COLUMNS: &str = "id, order_no, user_id, order_type, module_order_id, title, description, \
  total_amount_cents, payment_status, payment_method, payment_time, created_at, updated_at";

#[derive(Debug, FromRow)]
struct LedgerRow {
  id: i64,
  order_no: String,
  user_id: i64,
  order_type: String,
  module_order_id: Option<i64>,
  title: String,
  description: String,
  total_amount_cents: i64,
  payment_status: i16,
  payment_method: Option<String>,
  payment_time: Option<DateTime<Utc>>,
  created_at: DateTime<Utc>,
  updated_at: DateTime<Utc>,
}

impl TryFrom<LedgerRow> for UnifiedOrder {
  type Error = LedgerError;

  fn try_from(row: LedgerRow) -> Result<Self, Self::Error> {
    let order_type: OrderType = row
      .order_type
      .parse()
      .map_err(|e| LedgerError::from(anyhow::anyhow!("corrupt order_type column: {}", e)))?;
    Ok(UnifiedOrder {
      id: row.id,
      order_no: row.order_no,
      user_id: row.user_id,
      order_type,
      module_ref: ModuleOrderRef::from_columns(order_type, row.module_order_id),
      title: row.title,
      description: row.description,
      total_amount_cents: row.total_amount_cents,
      payment_status: decode_status(row.payment_status, PaymentStatus::from_code)?,
      payment_method: row.payment_method,
      payment_time: row.payment_time,
      created_at: row.created_at,
      updated_at: row.updated_at,
    })
  }
}

#[derive(Debug, FromRow)]
struct StatsRow {
  total: i64,
  unpaid: i64,
  paid: i64,
  cancelled: i64,
  completed: i64,
}

pub struct PgLedger {
  pool: PgPool,
}

impl PgLedger {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl LedgerStore for PgLedger {
  async fn insert(&self, entry: NewLedgerEntry) -> LedgerResult<UnifiedOrder> {
    let sql = format!(
      "INSERT INTO unified_order (order_no, user_id, order_type, module_order_id, title, description, \
       total_amount_cents, payment_status) VALUES ($1, $2, $3, $4, $5, $6, $7, 0)
       ON CONFLICT (order_no) DO NOTHING
       RETURNING {}",
      LEDGER_COLUMNS
    );
    let row: Option<LedgerRow> = sqlx::query_as(&sql)
      .bind(&entry.order_no)
      .bind(entry.user_id)
      .bind(entry.order_type.as_str())
      .bind(entry.module_ref.map(|r| r.id()))
      .bind(&entry.title)
      .bind(&entry.description)
      .bind(entry.total_amount_cents)
      .fetch_optional(&self.pool)
      .await
      .map_err(storage_err)?;

    row
      .ok_or_else(|| LedgerError::Persistence(format!("ledger insert for {} wrote no row", entry.order_no)))?
      .try_into()
  }

  async fn find_by_order_no(&self, order_no: &str) -> LedgerResult<Option<UnifiedOrder>> {
    let sql = format!("SELECT {} FROM unified_order WHERE order_no = $1", LEDGER_COLUMNS);
    let row: Option<LedgerRow> = sqlx::query_as(&sql)
      .bind(order_no)
      .fetch_optional(&self.pool)
      .await
      .map_err(storage_err)?;
    row.map(UnifiedOrder::try_from).transpose()
  }

  async fn list_for_user(&self, user_id: i64, filter: &LedgerFilter) -> LedgerResult<Vec<UnifiedOrder>> {
    let sql = format!(
      "SELECT {} FROM unified_order
       WHERE user_id = $1
         AND ($2::TEXT IS NULL OR order_type = $2)
         AND ($3::SMALLINT IS NULL OR payment_status = $3)
       ORDER BY created_at DESC, id DESC",
      LEDGER_COLUMNS
    );
    let rows: Vec<LedgerRow> = sqlx::query_as(&sql)
      .bind(user_id)
      .bind(filter.order_type.map(|t| t.as_str()))
      .bind(filter.payment_status.map(|s| s.code()))
      .fetch_all(&self.pool)
      .await
      .map_err(storage_err)?;
    rows.into_iter().map(UnifiedOrder::try_from).collect()
  }

  async fn find_unpaid_for_module(&self, module_ref: ModuleOrderRef) -> LedgerResult<Option<UnifiedOrder>> {
    let sql = format!(
      "SELECT {} FROM unified_order
       WHERE order_type = $1 AND module_order_id = $2 AND payment_status = 0
       ORDER BY created_at DESC, id DESC LIMIT 1",
      LEDGER_COLUMNS
    );
    let row: Option<LedgerRow> = sqlx::query_as(&sql)
      .bind(module_ref.order_type().as_str())
      .bind(module_ref.id())
      .fetch_optional(&self.pool)
      .await
      .map_err(storage_err)?;
    row.map(UnifiedOrder::try_from).transpose()
  }

  async fn mark_paid(&self, order_no: &str, payment_method: &str, paid_at: DateTime<Utc>) -> LedgerResult<bool> {
    let result = sqlx::query(
      "UPDATE unified_order
       SET payment_status = 1, payment_method = $2, payment_time = $3, updated_at = $3
       WHERE order_no = $1 AND payment_status = 0",
    )
    .bind(order_no)
    .bind(payment_method)
    .bind(paid_at)
    .execute(&self.pool)
    .await
    .map_err(storage_err)?;
    Ok(result.rows_affected() > 0)
  }

  async fn cancel(&self, order_no: &str) -> LedgerResult<bool> {
    let result = sqlx::query(
      "UPDATE unified_order SET payment_status = 2, updated_at = NOW()
       WHERE order_no = $1 AND payment_status = 0",
    )
    .bind(order_no)
    .execute(&self.pool)
    .await
    .map_err(storage_err)?;
    Ok(result.rows_affected() > 0)
  }

  async fn delete_cancelled(&self, order_no: &str, user_id: i64) -> LedgerResult<bool> {
    let result = sqlx::query("DELETE FROM unified_order WHERE order_no = $1 AND user_id = $2 AND payment_status = 2")
      .bind(order_no)
      .bind(user_id)
      .execute(&self.pool)
      .await
      .map_err(storage_err)?;
    Ok(result.rows_affected() > 0)
  }

  async fn stats_for_user(&self, user_id: i64) -> LedgerResult<OrderStats> {
    let row: StatsRow = sqlx::query_as(
      "SELECT COUNT(*) AS total,
              COUNT(*) FILTER (WHERE payment_status = 0) AS unpaid,
              COUNT(*) FILTER (WHERE payment_status = 1) AS paid,
              COUNT(*) FILTER (WHERE payment_status = 2) AS cancelled,
              COUNT(*) FILTER (WHERE payment_status = 3) AS completed
       FROM unified_order WHERE user_id = $1",
    )
    .bind(user_id)
    .fetch_one(&self.pool)
    .await
    .map_err(storage_err)?;

    Ok(OrderStats {
      total: row.total,
      unpaid: row.unpaid,
      paid: row.paid,
      cancelled: row.cancelled,
      completed: row.completed,
    })
  }
}
