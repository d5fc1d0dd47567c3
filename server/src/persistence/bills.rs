// server/src/persistence/bills.rs

use super::{decode_status, storage_err, write_back_link};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use xihu_core::model::{BillStatus, ModuleTransition};
use xihu_core::modules::{OverdueBills, PaymentBill};
use xihu_core::{LedgerResult, ModuleOrderStore};

#[derive(Debug, FromRow)]
struct BillRow {
  id: i64,
  user_id: i64,
  bill_number: String,
  payment_type_name: String,
  bill_period: String,
  amount_cents: i64,
  due_date: NaiveDate,
  status: i16,
  paid_time: Option<DateTime<Utc>>,
  unified_order_no: Option<String>,
  created_at: DateTime<Utc>,
}

impl TryFrom<BillRow> for PaymentBill {
  type Error = xihu_core::LedgerError;

  fn try_from(row: BillRow) -> Result<Self, Self::Error> {
    Ok(PaymentBill {
      id: row.id,
      user_id: row.user_id,
      bill_number: row.bill_number,
      payment_type_name: row.payment_type_name,
      bill_period: row.bill_period,
      amount_cents: row.amount_cents,
      due_date: row.due_date,
      status: decode_status(row.status, BillStatus::from_code)?,
      paid_time: row.paid_time,
      unified_order_no: row.unified_order_no,
      created_at: row.created_at,
    })
  }
}

pub struct PgBills {
  pool: PgPool,
}

impl PgBills {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl ModuleOrderStore<PaymentBill> for PgBills {
  async fn insert(&self, mut bill: PaymentBill) -> LedgerResult<PaymentBill> {
    let id: i64 = sqlx::query_scalar(
      "INSERT INTO payment_bill (user_id, bill_number, payment_type_name, bill_period, amount_cents, due_date,
         status, created_at, updated_at)
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
       RETURNING id",
    )
    .bind(bill.user_id)
    .bind(&bill.bill_number)
    .bind(&bill.payment_type_name)
    .bind(&bill.bill_period)
    .bind(bill.amount_cents)
    .bind(bill.due_date)
    .bind(bill.status.code())
    .bind(bill.created_at)
    .fetch_one(&self.pool)
    .await
    .map_err(storage_err)?;

    bill.id = id;
    Ok(bill)
  }

  async fn find(&self, id: i64) -> LedgerResult<Option<PaymentBill>> {
    let row: Option<BillRow> = sqlx::query_as(
      "SELECT id, user_id, bill_number, payment_type_name, bill_period, amount_cents, due_date, status,
              paid_time, unified_order_no, created_at
       FROM payment_bill WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(&self.pool)
    .await
    .map_err(storage_err)?;
    row.map(PaymentBill::try_from).transpose()
  }

  async fn set_unified_order_no(&self, id: i64, order_no: &str) -> LedgerResult<bool> {
    write_back_link(&self.pool, "payment_bill", id, order_no).await
  }

  /// Bills only ever confirm; overdue bills are still payable.
  async fn transition(&self, id: i64, transition: ModuleTransition, at: DateTime<Utc>) -> LedgerResult<bool> {
    if transition != ModuleTransition::Confirm {
      return Ok(false);
    }
    let result = sqlx::query(
      "UPDATE payment_bill SET status = 1, paid_time = $2, updated_at = $2
       WHERE id = $1 AND status IN (0, 2)",
    )
    .bind(id)
    .bind(at)
    .execute(&self.pool)
    .await
    .map_err(storage_err)?;
    Ok(result.rows_affected() > 0)
  }
}

#[async_trait]
impl OverdueBills for PgBills {
  async fn mark_overdue(&self, today: NaiveDate) -> LedgerResult<u64> {
    let result = sqlx::query(
      "UPDATE payment_bill SET status = 2, updated_at = NOW() WHERE status = 0 AND due_date < $1",
    )
    .bind(today)
    .execute(&self.pool)
    .await
    .map_err(storage_err)?;
    Ok(result.rows_affected())
  }
}
