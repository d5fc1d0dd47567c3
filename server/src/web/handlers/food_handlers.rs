// server/src/web/handlers/food_handlers.rs

use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;
use xihu_core::modules::TakeoutRequest;
use xihu_core::OrderModule;

use super::owned_module_order;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::SessionUser;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CancelTakeoutPayload {
  pub order_id: i64,
}

#[instrument(name = "handler::takeout", skip(app_state, user, request), fields(user_id = user.user_id, restaurant_id = request.restaurant_id))]
pub async fn takeout_handler(
  app_state: web::Data<AppState>,
  user: SessionUser,
  request: web::Json<TakeoutRequest>,
) -> Result<HttpResponse, AppError> {
  let placed = app_state.placements.food.place(user.user_id, request.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "orderNo": placed.order_no,
    "orderId": placed.module_order_id,
    "redirectUrl": placed.redirect_url,
  })))
}

#[instrument(name = "handler::takeout_cancel", skip(app_state, user), fields(user_id = user.user_id, order_id = payload.order_id))]
pub async fn cancel_takeout_handler(
  app_state: web::Data<AppState>,
  user: SessionUser,
  payload: web::Json<CancelTakeoutPayload>,
) -> Result<HttpResponse, AppError> {
  let module = app_state.modules.food.as_ref();
  owned_module_order(module, payload.order_id, user.user_id).await?;

  let cancelled = module.cancel(payload.order_id).await?;
  let message = if cancelled {
    "Order cancelled"
  } else {
    "Order cannot be cancelled in its current state"
  };
  Ok(HttpResponse::Ok().json(json!({ "success": cancelled, "message": message })))
}
