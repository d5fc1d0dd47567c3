// tests/rating_tests.rs
mod common;

use common::*;
use serial_test::serial;
use xihu_core::memory::MemoryReviews;
use xihu_core::rating::{average_rating, submit_review, NewReview, ReviewTarget};
use xihu_core::{LedgerError, ReviewStore};

fn review(target: ReviewTarget, rating: f64) -> NewReview {
  NewReview {
    target,
    user_id: ALICE,
    username: "alice".to_string(),
    rating,
    content: "Quiet room, lovely view".to_string(),
  }
}

#[test]
fn test_average_rating() {
  assert_eq!(average_rating(&[]), None);
  assert_eq!(average_rating(&[4.0]), Some(4.0));
  assert_eq!(average_rating(&[5.0, 4.0, 4.0]), Some(13.0 / 3.0));
}

#[tokio::test]
#[serial]
async fn test_each_review_rewrites_the_average() {
  setup_tracing();
  let store = MemoryReviews::new();
  let hotel = ReviewTarget::Hotel(7);
  store.register_target(hotel);

  assert_eq!(submit_review(&store, review(hotel, 5.0)).await.unwrap(), Some(5.0));
  assert_eq!(store.score(hotel), Some(5.0));

  assert_eq!(submit_review(&store, review(hotel, 3.0)).await.unwrap(), Some(4.0));
  assert_eq!(store.score(hotel), Some(4.0));

  assert_eq!(store.list_reviews(hotel).await.unwrap().len(), 2);
}

#[tokio::test]
#[serial]
async fn test_scores_are_kept_per_target() {
  setup_tracing();
  let store = MemoryReviews::new();
  let hotel = ReviewTarget::Hotel(1);
  let restaurant = ReviewTarget::Restaurant(1);
  store.register_target(hotel);
  store.register_target(restaurant);

  submit_review(&store, review(hotel, 2.0)).await.unwrap();
  submit_review(&store, review(restaurant, 5.0)).await.unwrap();

  assert_eq!(store.score(hotel), Some(2.0));
  assert_eq!(store.score(restaurant), Some(5.0));
}

#[tokio::test]
#[serial]
async fn test_out_of_range_rating_is_rejected() {
  setup_tracing();
  let store = MemoryReviews::new();
  let hotel = ReviewTarget::Hotel(7);
  store.register_target(hotel);

  let result = submit_review(&store, review(hotel, 5.5)).await;
  assert!(matches!(result, Err(LedgerError::Validation(_))));
  assert!(store.list_reviews(hotel).await.unwrap().is_empty());
}

#[tokio::test]
#[serial]
async fn test_review_of_unknown_target_is_kept_without_score() {
  setup_tracing();
  let store = MemoryReviews::new();
  let ghost = ReviewTarget::Restaurant(404);

  assert_eq!(submit_review(&store, review(ghost, 4.0)).await.unwrap(), None);
  assert_eq!(store.list_reviews(ghost).await.unwrap().len(), 1);
  assert_eq!(store.score(ghost), None);
}
