// server/src/web/handlers/bill_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;
use xihu_core::modules::BillPaymentRequest;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::SessionUser;

/// Opens (or reopens) the ledger row for a bill and sends the client to checkout.
#[instrument(name = "handler::bill_pay", skip(app_state, user), fields(user_id = user.user_id, bill_id = request.bill_id))]
pub async fn pay_bill_handler(
  app_state: web::Data<AppState>,
  user: SessionUser,
  request: web::Json<BillPaymentRequest>,
) -> Result<HttpResponse, AppError> {
  let placed = app_state.placements.bill.place(user.user_id, request.into_inner()).await?;
  let message = if placed.reused {
    "Existing unpaid order found"
  } else {
    "Payment order created"
  };
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "orderNo": placed.order_no,
    "redirectUrl": placed.redirect_url,
    "message": message,
  })))
}
