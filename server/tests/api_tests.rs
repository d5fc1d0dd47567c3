// server/tests/api_tests.rs

use actix_web::cookie::Cookie;
use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use chrono::{NaiveDate, Utc};
use serde_json::{json, Value};
use std::sync::Arc;
use xihu_core::model::BillStatus;
use xihu_core::modules::PaymentBill;
use xihu_core::ModuleOrderStore;
use xihu_server::config::AppConfig;
use xihu_server::state::{AppState, Stores};
use xihu_server::web::configure_app_routes;

const COOKIE: &str = "XIHU_SESSION";

fn memory_state() -> AppState {
  AppState::new(Arc::new(AppConfig::in_memory()), Stores::in_memory())
}

macro_rules! app {
  ($state:expr) => {
    test::init_service(
      App::new()
        .app_data(web::Data::new($state.clone()))
        .configure(configure_app_routes),
    )
    .await
  };
}

/// Registers `username` and logs in, returning the session cookie.
macro_rules! login {
  ($app:expr, $username:expr) => {{
    let req = test::TestRequest::post()
      .uri("/user/register")
      .set_json(json!({ "username": $username, "password": "secret-pass" }))
      .to_request();
    let resp = test::call_service(&$app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::post()
      .uri("/user/login")
      .set_json(json!({ "username": $username, "password": "secret-pass" }))
      .to_request();
    let resp = test::call_service(&$app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp
      .response()
      .cookies()
      .find(|c| c.name() == COOKIE)
      .expect("login sets the session cookie");
    Cookie::new(COOKIE, cookie.value().to_string())
  }};
}

fn hotel_booking_body() -> Value {
  json!({
    "hotelId": 7,
    "hotelName": "Lakeside Inn",
    "roomId": 3,
    "roomName": "Deluxe Twin",
    "checkIn": "2024-01-10",
    "checkOut": "2024-01-12",
    "guests": 2,
    "contactName": "Li Lei",
    "contactPhone": "13800000000",
    "totalPriceCents": 40000
  })
}

#[actix_rt::test]
async fn health_reports_ok() {
  let state = memory_state();
  let app = app!(state);
  let resp: Value = test::call_and_read_body_json(&app, test::TestRequest::get().uri("/health").to_request()).await;
  assert_eq!(resp["status"], "ok");
}

#[actix_rt::test]
async fn json_routes_without_session_answer_not_login() {
  let state = memory_state();
  let app = app!(state);

  let req = test::TestRequest::get().uri("/unified-new/order/list").to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["success"], false);
  assert_eq!(body["code"], "NOT_LOGIN");
}

#[actix_rt::test]
async fn wrong_password_is_rejected() {
  let state = memory_state();
  let app = app!(state);
  let _ = login!(app, "alice");

  let req = test::TestRequest::post()
    .uri("/user/login")
    .set_json(json!({ "username": "alice", "password": "not-it" }))
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_rt::test]
async fn hotel_booking_checkout_and_single_payment() {
  let state = memory_state();
  let app = app!(state);
  let cookie = login!(app, "alice");

  let req = test::TestRequest::post()
    .uri("/hc/bookings")
    .cookie(cookie.clone())
    .set_json(hotel_booking_body())
    .to_request();
  let booked: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(booked["code"], 200);
  let order_no = booked["unifiedOrderNo"].as_str().unwrap().to_string();
  assert!(order_no.starts_with("UOHOTEL"));
  assert_eq!(
    booked["redirectUrl"],
    format!("/unified-new/payment/checkout?orderNo={}", order_no)
  );

  let req = test::TestRequest::get()
    .uri(&format!("/unified-new/payment/checkout?orderNo={}", order_no))
    .cookie(cookie.clone())
    .to_request();
  let view: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(view["data"]["order"]["totalAmountCents"], 40000);
  assert_eq!(view["data"]["detailType"], "HOTEL");
  assert_eq!(view["data"]["orderDetails"][0]["nights"], 2);
  assert_eq!(view["data"]["orderDetails"][0]["roomPriceCents"], 20000);

  let pay = json!({ "orderNo": order_no, "paymentMethod": "alipay" });
  let req = test::TestRequest::post()
    .uri("/unified-new/payment/process")
    .cookie(cookie.clone())
    .set_json(&pay)
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let req = test::TestRequest::post()
    .uri("/unified-new/payment/process")
    .cookie(cookie.clone())
    .set_json(&pay)
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["code"], "INVALID_STATE");

  let req = test::TestRequest::get()
    .uri("/unified-new/order/stats")
    .cookie(cookie)
    .to_request();
  let stats: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(stats["data"]["total"], 1);
  assert_eq!(stats["data"]["paid"], 1);
}

#[actix_rt::test]
async fn checkout_redirects_when_logged_out_or_foreign() {
  let state = memory_state();
  let app = app!(state);

  let req = test::TestRequest::get()
    .uri("/unified-new/payment/checkout?orderNo=UOSHOP1")
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::FOUND);
  let location = resp.headers().get(header::LOCATION).unwrap().to_str().unwrap();
  assert_eq!(
    location,
    "/user/login?redirect=%2Funified-new%2Fpayment%2Fcheckout%3ForderNo%3DUOSHOP1"
  );

  let alice = login!(app, "alice");
  let bob = login!(app, "bob");
  let req = test::TestRequest::post()
    .uri("/travel/order/book")
    .cookie(alice)
    .set_json(json!({
      "attractionId": 1,
      "attractionName": "Leifeng Pagoda",
      "visitDate": "2024-05-01",
      "ticketCount": 2,
      "ticketPriceCents": 4000
    }))
    .to_request();
  let booked: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(booked["amountCents"], 8000);
  let order_no = booked["orderNo"].as_str().unwrap().to_string();

  let req = test::TestRequest::get()
    .uri(&format!("/unified-new/payment/checkout?orderNo={}", order_no))
    .cookie(bob)
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::FOUND);
  let location = resp.headers().get(header::LOCATION).unwrap().to_str().unwrap();
  assert!(location.starts_with("/unified-new/orders?error="));
}

#[actix_rt::test]
async fn paying_a_bill_twice_reuses_the_unpaid_order() {
  let state = memory_state();
  let app = app!(state);
  let cookie = login!(app, "alice");

  let bill = state
    .stores
    .bills
    .insert(PaymentBill {
      id: 0,
      user_id: 1,
      bill_number: "WATER-2024-05".to_string(),
      payment_type_name: "Water".to_string(),
      bill_period: "2024-05".to_string(),
      amount_cents: 5230,
      due_date: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
      status: BillStatus::Unpaid,
      paid_time: None,
      unified_order_no: None,
      created_at: Utc::now(),
    })
    .await
    .unwrap();

  let pay_bill = || {
    test::TestRequest::post()
      .uri("/payment/pay")
      .cookie(cookie.clone())
      .set_json(json!({ "billId": bill.id }))
      .to_request()
  };
  let first: Value = test::call_and_read_body_json(&app, pay_bill()).await;
  let second: Value = test::call_and_read_body_json(&app, pay_bill()).await;
  assert_eq!(first["success"], true);
  assert_eq!(first["orderNo"], second["orderNo"]);

  let req = test::TestRequest::get()
    .uri("/unified-new/order/list?orderType=PAYMENT")
    .cookie(cookie)
    .to_request();
  let listed: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(listed["total"], 1);
}

#[actix_rt::test]
async fn cancel_then_delete_standalone_order() {
  let state = memory_state();
  let app = app!(state);
  let cookie = login!(app, "alice");

  let req = test::TestRequest::post()
    .uri("/unified-new/order/create")
    .cookie(cookie.clone())
    .set_json(json!({
      "orderType": "SHOPPING",
      "orderTitle": "Gift card",
      "orderDescription": "Standalone",
      "totalAmountCents": 10000
    }))
    .to_request();
  let created: Value = test::call_and_read_body_json(&app, req).await;
  let order_no = created["orderNo"].as_str().unwrap().to_string();

  let req = test::TestRequest::post()
    .uri("/unified-new/order/delete")
    .cookie(cookie.clone())
    .set_json(json!({ "orderNo": order_no }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CONFLICT);

  for (uri, expected) in [
    ("/unified-new/order/cancel", StatusCode::OK),
    ("/unified-new/order/cancel", StatusCode::CONFLICT),
    ("/unified-new/order/delete", StatusCode::OK),
  ] {
    let req = test::TestRequest::post()
      .uri(uri)
      .cookie(cookie.clone())
      .set_json(json!({ "orderNo": order_no }))
      .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), expected, "{}", uri);
  }
}

#[actix_rt::test]
async fn list_filters_by_status_and_treats_blank_values_as_any() {
  let state = memory_state();
  let app = app!(state);
  let cookie = login!(app, "alice");

  let mut order_nos = Vec::new();
  for title in ["Gift card", "Tea set", "Silk scarf"] {
    let req = test::TestRequest::post()
      .uri("/unified-new/order/create")
      .cookie(cookie.clone())
      .set_json(json!({
        "orderType": "SHOPPING",
        "orderTitle": title,
        "orderDescription": "Standalone",
        "totalAmountCents": 2500
      }))
      .to_request();
    let created: Value = test::call_and_read_body_json(&app, req).await;
    order_nos.push(created["orderNo"].as_str().unwrap().to_string());
  }

  let req = test::TestRequest::post()
    .uri("/unified-new/payment/process")
    .cookie(cookie.clone())
    .set_json(json!({ "orderNo": order_nos[0], "paymentMethod": "wechat" }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  let req = test::TestRequest::post()
    .uri("/unified-new/order/cancel")
    .cookie(cookie.clone())
    .set_json(json!({ "orderNo": order_nos[1] }))
    .to_request();
  assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

  for (query, expected_total) in [
    ("paymentStatus=0", 1),
    ("paymentStatus=1", 1),
    ("paymentStatus=2", 1),
    ("paymentStatus=3", 0),
    ("orderType=&paymentStatus=", 3),
    ("orderType=", 3),
    ("paymentStatus=", 3),
    ("orderType=SHOPPING&paymentStatus=", 3),
    ("orderType=shopping&paymentStatus=1", 1),
    ("orderType=HOTEL&paymentStatus=", 0),
  ] {
    let req = test::TestRequest::get()
      .uri(&format!("/unified-new/order/list?{}", query))
      .cookie(cookie.clone())
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK, "{}", query);
    let listed: Value = test::read_body_json(resp).await;
    assert_eq!(listed["total"], expected_total, "{}", query);
  }

  let req = test::TestRequest::get()
    .uri("/unified-new/order/list?paymentStatus=1")
    .cookie(cookie)
    .to_request();
  let paid: Value = test::call_and_read_body_json(&app, req).await;
  assert_eq!(paid["data"][0]["orderNo"], order_nos[0].as_str());
}

#[actix_rt::test]
async fn malformed_input_answers_with_validation_envelope() {
  let state = memory_state();
  let app = app!(state);
  let cookie = login!(app, "alice");

  let req = test::TestRequest::post()
    .uri("/unified-new/payment/process")
    .cookie(cookie.clone())
    .insert_header(header::ContentType::json())
    .set_payload("{not json")
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["success"], false);
  assert_eq!(body["code"], "VALIDATION");

  for query in ["orderType=CRUISE", "paymentStatus=9", "paymentStatus=paid"] {
    let req = test::TestRequest::get()
      .uri(&format!("/unified-new/order/list?{}", query))
      .cookie(cookie.clone())
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", query);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false, "{}", query);
    assert_eq!(body["code"], "VALIDATION", "{}", query);
  }

  let req = test::TestRequest::post()
    .uri("/hc/orders/not-a-number/cancel")
    .cookie(cookie)
    .to_request();
  let resp = test::call_service(&app, req).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
  let body: Value = test::read_body_json(resp).await;
  assert_eq!(body["code"], "VALIDATION");
}
