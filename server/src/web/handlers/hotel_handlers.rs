// server/src/web/handlers/hotel_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};
use xihu_core::modules::HotelBooking;
use xihu_core::OrderModule;

use super::owned_module_order;
use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::SessionUser;

#[instrument(name = "handler::hotel_booking", skip(app_state, user, booking), fields(user_id = user.user_id, hotel_id = booking.hotel_id))]
pub async fn create_booking_handler(
  app_state: web::Data<AppState>,
  user: SessionUser,
  booking: web::Json<HotelBooking>,
) -> Result<HttpResponse, AppError> {
  let placed = app_state.placements.hotel.place(user.user_id, booking.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
    "code": 200,
    "message": "Booking created",
    "orderNo": placed.module_order_no,
    "unifiedOrderNo": placed.order_no,
    "redirectUrl": placed.redirect_url,
  })))
}

/// Pending hotel order to cancelled. Only the module row changes.
#[instrument(name = "handler::hotel_cancel", skip(app_state, user), fields(user_id = user.user_id))]
pub async fn cancel_booking_handler(
  app_state: web::Data<AppState>,
  user: SessionUser,
  order_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let order_id = order_id.into_inner();
  let module = app_state.modules.hotel.as_ref();
  owned_module_order(module, order_id, user.user_id).await?;

  if module.cancel(order_id).await? {
    info!(order_id, "Hotel order cancelled.");
    Ok(HttpResponse::Ok().json(json!({ "code": 200, "message": "Order cancelled" })))
  } else {
    Ok(HttpResponse::Ok().json(json!({
      "code": 400,
      "message": "Order cannot be cancelled in its current state",
    })))
  }
}

/// Pending hotel order to confirmed.
#[instrument(name = "handler::hotel_make_sure", skip(app_state, user), fields(user_id = user.user_id))]
pub async fn confirm_booking_handler(
  app_state: web::Data<AppState>,
  user: SessionUser,
  order_id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
  let order_id = order_id.into_inner();
  let module = app_state.modules.hotel.as_ref();
  owned_module_order(module, order_id, user.user_id).await?;

  if module.confirm(order_id).await? {
    info!(order_id, "Hotel order confirmed.");
    Ok(HttpResponse::Ok().json(json!({ "code": 200, "message": "Order confirmed" })))
  } else {
    Ok(HttpResponse::Ok().json(json!({
      "code": 400,
      "message": "Order cannot be confirmed in its current state",
    })))
  }
}
