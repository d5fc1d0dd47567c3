// server/src/web/handlers/auth_handlers.rs

use actix_web::cookie::{time::Duration as CookieDuration, Cookie, SameSite};
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::services::auth_service;
use crate::state::AppState;
use crate::web::extractors::SessionUser;

#[derive(Deserialize, Debug)]
pub struct RegisterPayload {
  pub username: String,
  pub password: String,
  #[serde(default)]
  pub phone: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct LoginPayload {
  pub username: String,
  pub password: String,
}

fn session_cookie(state: &AppState, value: String, max_age: CookieDuration) -> Cookie<'static> {
  Cookie::build(state.config.session_cookie_name.clone(), value)
    .path("/")
    .http_only(true)
    .same_site(SameSite::Lax)
    .max_age(max_age)
    .finish()
}

#[instrument(name = "handler::register", skip(app_state, payload), fields(username = %payload.username))]
pub async fn register_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<RegisterPayload>,
) -> Result<HttpResponse, AppError> {
  let payload = payload.into_inner();
  let user = auth_service::register_user(
    app_state.stores.users.as_ref(),
    &payload.username,
    &payload.password,
    payload.phone,
  )
  .await?;

  Ok(HttpResponse::Created().json(json!({
    "success": true,
    "userId": user.id,
  })))
}

#[instrument(name = "handler::login", skip(app_state, payload), fields(username = %payload.username))]
pub async fn login_handler(
  app_state: web::Data<AppState>,
  payload: web::Json<LoginPayload>,
) -> Result<HttpResponse, AppError> {
  let user = auth_service::authenticate(app_state.stores.users.as_ref(), &payload.username, &payload.password).await?;
  let token = app_state.sessions.create(user.id, &user.username);
  info!(user_id = user.id, "User signed in.");

  let cookie = session_cookie(
    &app_state,
    token.to_string(),
    CookieDuration::hours(app_state.config.session_ttl_hours),
  );
  Ok(HttpResponse::Ok().cookie(cookie).json(json!({
    "success": true,
    "user": user,
  })))
}

#[instrument(name = "handler::logout", skip(app_state, user), fields(user_id = user.user_id))]
pub async fn logout_handler(app_state: web::Data<AppState>, user: SessionUser) -> Result<HttpResponse, AppError> {
  app_state.sessions.remove(&user.token);
  let expired = session_cookie(&app_state, String::new(), CookieDuration::ZERO);
  Ok(HttpResponse::Ok().cookie(expired).json(json!({ "success": true })))
}
