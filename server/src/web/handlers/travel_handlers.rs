// server/src/web/handlers/travel_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::instrument;
use xihu_core::modules::TicketBooking;

use crate::errors::AppError;
use crate::state::AppState;
use crate::web::extractors::SessionUser;

#[instrument(name = "handler::travel_book", skip(app_state, user, booking), fields(user_id = user.user_id, attraction_id = booking.attraction_id))]
pub async fn book_tickets_handler(
  app_state: web::Data<AppState>,
  user: SessionUser,
  booking: web::Json<TicketBooking>,
) -> Result<HttpResponse, AppError> {
  let placed = app_state.placements.travel.place(user.user_id, booking.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({
    "success": true,
    "orderNo": placed.order_no,
    "amountCents": placed.amount_cents,
    "redirectUrl": placed.redirect_url,
  })))
}
