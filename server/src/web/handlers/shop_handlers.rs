// server/src/web/handlers/shop_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;
use xihu_core::modules::ShopCheckout;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::SessionUser;

#[instrument(name = "handler::shop_checkout", skip(app_state, user, cart), fields(user_id = user.user_id, items = cart.items.len()))]
pub async fn checkout_cart_handler(
  app_state: web::Data<AppState>,
  user: SessionUser,
  cart: web::Json<ShopCheckout>,
) -> Result<HttpResponse, AppError> {
  let placed = app_state.placements.shop.place(user.user_id, cart.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "orderNo": placed.order_no,
    "redirectUrl": placed.redirect_url,
  })))
}
