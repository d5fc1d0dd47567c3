// server/src/web/routes.rs

use actix_web::web;
use std::fmt::Display;

use crate::errors::AppError;
use crate::web::handlers::{
  auth_handlers, bill_handlers, food_handlers, hotel_handlers, review_handlers, shop_handlers, travel_handlers,
  unified_handlers,
};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

// Malformed bodies, queries and paths answer with the JSON error envelope.
fn payload_error(err: impl Display) -> actix_web::Error {
  tracing::debug!(error = %err, "Rejected malformed request input.");
  AppError::Validation(err.to_string()).into()
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  cfg
    .app_data(web::JsonConfig::default().error_handler(|err, _req| payload_error(err)))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| payload_error(err)))
    .app_data(web::PathConfig::default().error_handler(|err, _req| payload_error(err)))
    .route("/health", web::get().to(health_check_handler))
    .service(
      web::scope("/user")
        .route("/register", web::post().to(auth_handlers::register_handler))
        .route("/login", web::post().to(auth_handlers::login_handler))
        .route("/logout", web::post().to(auth_handlers::logout_handler)),
    )
    .service(
      web::scope("/hc")
        .route("/bookings", web::post().to(hotel_handlers::create_booking_handler))
        .route("/orders/{order_id}/cancel", web::post().to(hotel_handlers::cancel_booking_handler))
        .route("/orders/{order_id}/makeSure", web::post().to(hotel_handlers::confirm_booking_handler))
        .route("/review/submit", web::post().to(review_handlers::submit_hotel_review_handler))
        .route("/review/list", web::get().to(review_handlers::list_hotel_reviews_handler)),
    )
    .service(
      web::scope("/food")
        .route("/order/takeout", web::post().to(food_handlers::takeout_handler))
        .route("/order/cancel", web::post().to(food_handlers::cancel_takeout_handler))
        .route("/review/add", web::post().to(review_handlers::add_restaurant_review_handler))
        .route("/reviews/{restaurant_id}", web::get().to(review_handlers::list_restaurant_reviews_handler)),
    )
    .service(web::scope("/shop").route("/order/checkout", web::post().to(shop_handlers::checkout_cart_handler)))
    .service(web::scope("/travel").route("/order/book", web::post().to(travel_handlers::book_tickets_handler)))
    .service(web::scope("/payment").route("/pay", web::post().to(bill_handlers::pay_bill_handler)))
    .service(
      web::scope("/unified-new")
        .route("/payment/checkout", web::get().to(unified_handlers::checkout_handler))
        .route("/payment/process", web::post().to(unified_handlers::process_payment_handler))
        .route("/order/cancel", web::post().to(unified_handlers::cancel_order_handler))
        .route("/order/delete", web::post().to(unified_handlers::delete_order_handler))
        .route("/order/list", web::get().to(unified_handlers::list_orders_handler))
        .route("/order/create", web::post().to(unified_handlers::create_order_handler))
        .route("/order/stats", web::get().to(unified_handlers::order_stats_handler)),
    );
}
