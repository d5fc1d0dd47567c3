// server/src/web/handlers/unified_handlers.rs

//! Ledger-wide routes under `/unified-new`: the checkout page, payment, cancel,
//! delete, listing and stats.

use actix_web::http::header;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument, warn};
use xihu_core::model::{LedgerFilter, OrderType};
use xihu_core::placement::checkout_redirect_url;
use xihu_core::{LedgerError, StandaloneOrder};

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::SessionUser;

const LOGIN_PATH: &str = "/user/login";
const ORDERS_PAGE_PATH: &str = "/unified-new/orders";

fn encode(value: &str) -> String {
  url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn redirect(location: String) -> HttpResponse {
  HttpResponse::Found()
    .insert_header((header::LOCATION, location))
    .finish()
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutQuery {
  pub order_no: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
  pub order_no: String,
  #[serde(default)]
  pub payment_method: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct OrderNoPayload {
  pub order_no: String,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
  pub order_type: OrderType,
  pub order_title: String,
  #[serde(default)]
  pub order_description: String,
  pub total_amount_cents: i64,
}

/// Checkout page data. Browsers without a session are sent to the login page
/// and come back here afterwards; unknown or foreign orders bounce to the
/// order list with the error in the query.
#[instrument(name = "handler::checkout", skip(app_state, user), fields(order_no = %query.order_no))]
pub async fn checkout_handler(
  app_state: web::Data<AppState>,
  query: web::Query<CheckoutQuery>,
  user: Option<SessionUser>,
) -> Result<HttpResponse, AppError> {
  let Some(user) = user else {
    let back_to = checkout_redirect_url(&query.order_no);
    return Ok(redirect(format!("{}?redirect={}", LOGIN_PATH, encode(&back_to))));
  };

  match app_state.checkout.checkout(&query.order_no, user.user_id).await {
    Ok(view) => Ok(HttpResponse::Ok().json(json!({ "success": true, "data": view }))),
    Err(e @ (LedgerError::NotFound { .. } | LedgerError::Forbidden { .. })) => {
      warn!(error = %e, "Checkout refused.");
      Ok(redirect(format!("{}?error={}", ORDERS_PAGE_PATH, encode(&e.to_string()))))
    }
    Err(e) => Err(e.into()),
  }
}

#[instrument(name = "handler::process_payment", skip(app_state, user, payload), fields(user_id = user.user_id, order_no = %payload.order_no))]
pub async fn process_payment_handler(
  app_state: web::Data<AppState>,
  user: SessionUser,
  payload: web::Json<PaymentPayload>,
) -> Result<HttpResponse, AppError> {
  app_state
    .checkout
    .process_payment(&payload.order_no, user.user_id, &payload.payment_method)
    .await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Payment successful" })))
}

#[instrument(name = "handler::cancel_order", skip(app_state, user, payload), fields(user_id = user.user_id, order_no = %payload.order_no))]
pub async fn cancel_order_handler(
  app_state: web::Data<AppState>,
  user: SessionUser,
  payload: web::Json<OrderNoPayload>,
) -> Result<HttpResponse, AppError> {
  app_state.checkout.cancel_order(&payload.order_no, user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Order cancelled" })))
}

#[instrument(name = "handler::delete_order", skip(app_state, user, payload), fields(user_id = user.user_id, order_no = %payload.order_no))]
pub async fn delete_order_handler(
  app_state: web::Data<AppState>,
  user: SessionUser,
  payload: web::Json<OrderNoPayload>,
) -> Result<HttpResponse, AppError> {
  app_state.checkout.delete_order(&payload.order_no, user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "message": "Order deleted" })))
}

#[instrument(name = "handler::list_orders", skip(app_state, user), fields(user_id = user.user_id))]
pub async fn list_orders_handler(
  app_state: web::Data<AppState>,
  user: SessionUser,
  filter: web::Query<LedgerFilter>,
) -> Result<HttpResponse, AppError> {
  let orders = app_state.checkout.list_orders(user.user_id, filter.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "total": orders.len(),
    "data": orders,
  })))
}

#[instrument(name = "handler::order_stats", skip(app_state, user), fields(user_id = user.user_id))]
pub async fn order_stats_handler(app_state: web::Data<AppState>, user: SessionUser) -> Result<HttpResponse, AppError> {
  let stats = app_state.checkout.order_stats(user.user_id).await?;
  Ok(HttpResponse::Ok().json(json!({ "success": true, "data": stats })))
}

#[instrument(name = "handler::create_order", skip(app_state, user, payload), fields(user_id = user.user_id))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  user: SessionUser,
  payload: web::Json<CreateOrderPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let order = app_state
    .checkout
    .create_standalone_order(
      user.user_id,
      StandaloneOrder {
        order_type: payload.order_type,
        title: payload.order_title,
        description: payload.order_description,
        total_amount_cents: payload.total_amount_cents,
      },
    )
    .await?;
  info!(order_no = %order.order_no, "Standalone order created.");
  Ok(HttpResponse::Ok().json(json!({ "success": true, "orderNo": order.order_no })))
}
