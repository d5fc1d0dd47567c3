// server/src/web/extractors.rs

use crate::errors::AppError;
use crate::state::AppState;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::{debug, error};
use uuid::Uuid;
use xihu_core::LedgerError;

/// The logged-in user, resolved from the session cookie.
///
/// Rejects with `NOT_LOGIN` (401). Wrap in `Option` for routes that redirect
/// instead of failing.
#[derive(Debug, Clone)]
pub struct SessionUser {
  pub user_id: i64,
  pub username: String,
  pub token: Uuid,
}

impl SessionUser {
  fn resolve(req: &HttpRequest) -> Result<Self, AppError> {
    let Some(state) = req.app_data::<web::Data<AppState>>() else {
      error!("AppState is not registered with the app.");
      return Err(AppError::Internal("application state missing".to_string()));
    };

    let token = req
      .cookie(&state.config.session_cookie_name)
      .and_then(|cookie| Uuid::parse_str(cookie.value()).ok())
      .ok_or(LedgerError::NotLoggedIn)?;

    let session = state.sessions.get(&token).ok_or_else(|| {
      debug!("Session cookie does not match a live session.");
      LedgerError::NotLoggedIn
    })?;

    Ok(SessionUser {
      user_id: session.user_id,
      username: session.username,
      token,
    })
  }
}

impl FromRequest for SessionUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(SessionUser::resolve(req))
  }
}
