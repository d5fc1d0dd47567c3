// server/src/persistence/reviews.rs

use super::storage_err;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use xihu_core::rating::{NewReview, Review, ReviewTarget};
use xihu_core::{LedgerError, LedgerResult, ReviewStore};

const TARGET_HOTEL: &str = "HOTEL";
const TARGET_RESTAURANT: &str = "RESTAURANT";

fn target_columns(target: ReviewTarget) -> (&'static str, i64) {
  match target {
    ReviewTarget::Hotel(id) => (TARGET_HOTEL, id),
    ReviewTarget::Restaurant(id) => (TARGET_RESTAURANT, id),
  }
}

#[derive(Debug, FromRow)]
struct ReviewRow {
  id: i64,
  target_type: String,
  target_id: i64,
  user_id: i64,
  username: String,
  rating: f64,
  content: String,
  created_at: DateTime<Utc>,
}

impl TryFrom<ReviewRow> for Review {
  type Error = LedgerError;

  fn try_from(row: ReviewRow) -> Result<Self, Self::Error> {
    let target = match row.target_type.as_str() {
      TARGET_HOTEL => ReviewTarget::Hotel(row.target_id),
      TARGET_RESTAURANT => ReviewTarget::Restaurant(row.target_id),
      other => return Err(anyhow::anyhow!("corrupt review target_type: {}", other).into()),
    };
    Ok(Review {
      id: row.id,
      target,
      user_id: row.user_id,
      username: row.username,
      rating: row.rating,
      content: row.content,
      created_at: row.created_at,
    })
  }
}

pub struct PgReviews {
  pool: PgPool,
}

impl PgReviews {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl ReviewStore for PgReviews {
  async fn insert_review(&self, review: NewReview) -> LedgerResult<Review> {
    let (target_type, target_id) = target_columns(review.target);
    let row: ReviewRow = sqlx::query_as(
      "INSERT INTO review (target_type, target_id, user_id, username, rating, content)
       VALUES ($1, $2, $3, $4, $5, $6)
       RETURNING id, target_type, target_id, user_id, username, rating, content, created_at",
    )
    .bind(target_type)
    .bind(target_id)
    .bind(review.user_id)
    .bind(&review.username)
    .bind(review.rating)
    .bind(&review.content)
    .fetch_one(&self.pool)
    .await
    .map_err(storage_err)?;
    row.try_into()
  }

  async fn list_reviews(&self, target: ReviewTarget) -> LedgerResult<Vec<Review>> {
    let (target_type, target_id) = target_columns(target);
    let rows: Vec<ReviewRow> = sqlx::query_as(
      "SELECT id, target_type, target_id, user_id, username, rating, content, created_at
       FROM review WHERE target_type = $1 AND target_id = $2
       ORDER BY created_at DESC, id DESC",
    )
    .bind(target_type)
    .bind(target_id)
    .fetch_all(&self.pool)
    .await
    .map_err(storage_err)?;
    rows.into_iter().map(Review::try_from).collect()
  }

  async fn ratings_for(&self, target: ReviewTarget) -> LedgerResult<Vec<f64>> {
    let (target_type, target_id) = target_columns(target);
    sqlx::query_scalar("SELECT rating FROM review WHERE target_type = $1 AND target_id = $2")
      .bind(target_type)
      .bind(target_id)
      .fetch_all(&self.pool)
      .await
      .map_err(storage_err)
  }

  async fn update_score(&self, target: ReviewTarget, score: f64) -> LedgerResult<bool> {
    let sql = match target {
      ReviewTarget::Hotel(_) => "UPDATE hotel SET score = $2 WHERE id = $1",
      ReviewTarget::Restaurant(_) => "UPDATE restaurant SET score = $2 WHERE id = $1",
    };
    let result = sqlx::query(sql)
      .bind(target.id())
      .bind(score)
      .execute(&self.pool)
      .await
      .map_err(storage_err)?;
    Ok(result.rows_affected() > 0)
  }
}
