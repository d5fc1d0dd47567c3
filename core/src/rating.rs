// xihu_core/src/rating.rs

//! Reviews for hotels and restaurants, and the score written back after each one.

use crate::error::{LedgerError, LedgerResult};
use crate::store::ReviewStore;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, instrument, warn};

pub const MIN_RATING: f64 = 0.0;
pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ReviewTarget {
  Hotel(i64),
  Restaurant(i64),
}

impl ReviewTarget {
  pub fn id(&self) -> i64 {
    match *self {
      ReviewTarget::Hotel(id) | ReviewTarget::Restaurant(id) => id,
    }
  }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewReview {
  pub target: ReviewTarget,
  pub user_id: i64,
  pub username: String,
  pub rating: f64,
  pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
  pub id: i64,
  pub target: ReviewTarget,
  pub user_id: i64,
  pub username: String,
  pub rating: f64,
  pub content: String,
  pub created_at: DateTime<Utc>,
}

/// Arithmetic mean, or `None` for no ratings. Not rounded.
pub fn average_rating(ratings: &[f64]) -> Option<f64> {
  if ratings.is_empty() {
    return None;
  }
  Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
}

/// Stores the review, then recomputes the target's average and writes it back.
///
/// Returns the new score. The review is kept even if the score update fails;
/// that failure is logged and `Ok(None)` is returned.
#[instrument(name = "rating::submit_review", skip(store, review), fields(target = ?review.target, user_id = review.user_id))]
pub async fn submit_review(store: &dyn ReviewStore, review: NewReview) -> LedgerResult<Option<f64>> {
  if !review.rating.is_finite() || !(MIN_RATING..=MAX_RATING).contains(&review.rating) {
    return Err(LedgerError::validation(format!(
      "rating must be between {} and {}",
      MIN_RATING, MAX_RATING
    )));
  }
  let target = review.target;
  store.insert_review(review).await?;

  let ratings = store.ratings_for(target).await?;
  let Some(score) = average_rating(&ratings) else {
    return Ok(None);
  };

  match store.update_score(target, score).await {
    Ok(true) => {
      info!(score, reviews = ratings.len(), "Score updated.");
      Ok(Some(score))
    }
    Ok(false) => {
      warn!("Score not written: review target does not exist.");
      Ok(None)
    }
    Err(e) => {
      warn!(error = %e, "Score update failed; review kept.");
      Ok(None)
    }
  }
}
