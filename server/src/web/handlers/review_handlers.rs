// server/src/web/handlers/review_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use xihu_core::rating::{submit_review, NewReview, ReviewTarget};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::SessionUser;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HotelReviewPayload {
  pub hotel_id: i64,
  pub rating: f64,
  #[serde(default)]
  pub content: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RestaurantReviewPayload {
  pub restaurant_id: i64,
  pub rating: f64,
  #[serde(default)]
  pub content: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct HotelReviewQuery {
  pub hotel_id: i64,
}

async fn submit(
  app_state: &AppState,
  user: SessionUser,
  target: ReviewTarget,
  rating: f64,
  content: String,
) -> Result<HttpResponse, AppError> {
  let score = submit_review(
    app_state.stores.reviews.as_ref(),
    NewReview {
      target,
      user_id: user.user_id,
      username: user.username,
      rating,
      content,
    },
  )
  .await?;
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "message": "Review submitted",
    "score": score,
  })))
}

async fn list(app_state: &AppState, target: ReviewTarget) -> Result<HttpResponse, AppError> {
  let reviews = app_state.stores.reviews.list_reviews(target).await?;
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "total": reviews.len(),
    "data": reviews,
  })))
}

#[instrument(name = "handler::hotel_review_submit", skip(app_state, user, payload), fields(hotel_id = payload.hotel_id))]
pub async fn submit_hotel_review_handler(
  app_state: web::Data<AppState>,
  user: SessionUser,
  payload: web::Json<HotelReviewPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  submit(&app_state, user, ReviewTarget::Hotel(payload.hotel_id), payload.rating, payload.content).await
}

#[instrument(name = "handler::restaurant_review_add", skip(app_state, user, payload), fields(restaurant_id = payload.restaurant_id))]
pub async fn add_restaurant_review_handler(
  app_state: web::Data<AppState>,
  user: SessionUser,
  payload: web::Json<RestaurantReviewPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  submit(
    &app_state,
    user,
    ReviewTarget::Restaurant(payload.restaurant_id),
    payload.rating,
    payload.content,
  )
  .await
}

pub async fn list_hotel_reviews_handler(
  app_state: web::Data<AppState>,
  query: web::Query<HotelReviewQuery>,
) -> Result<HttpResponse, AppError> {
  list(&app_state, ReviewTarget::Hotel(query.hotel_id)).await
}

pub async fn list_restaurant_reviews_handler(
  app_state: web::Data<AppState>,
  restaurant_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  list(&app_state, ReviewTarget::Restaurant(restaurant_id.into_inner())).await
}
