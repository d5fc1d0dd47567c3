// server/src/services/sessions.rs

//! Server-side login sessions keyed by a random token stored in a cookie.

use crate::config::MAX_SESSION_TTL_HOURS;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
  pub user_id: i64,
  pub username: String,
  pub expires_at: DateTime<Utc>,
}

pub struct SessionStore {
  ttl: Duration,
  sessions: RwLock<HashMap<Uuid, Session>>,
}

impl SessionStore {
  /// `ttl_hours` is clamped to `1..=MAX_SESSION_TTL_HOURS`.
  pub fn new(ttl_hours: i64) -> Self {
    Self {
      ttl: Duration::hours(ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS)),
      sessions: RwLock::new(HashMap::new()),
    }
  }

  /// Starts a session and returns its token.
  pub fn create(&self, user_id: i64, username: &str) -> Uuid {
    let token = Uuid::new_v4();
    let session = Session {
      user_id,
      username: username.to_string(),
      expires_at: Utc::now() + self.ttl,
    };
    let mut sessions = self.sessions.write();
    sessions.retain(|_, s| s.expires_at > Utc::now());
    sessions.insert(token, session);
    debug!(user_id, "Session created.");
    token
  }

  /// The live session for `token`; expired sessions are dropped on lookup.
  pub fn get(&self, token: &Uuid) -> Option<Session> {
    let session = self.sessions.read().get(token).cloned()?;
    if session.expires_at <= Utc::now() {
      self.sessions.write().remove(token);
      return None;
    }
    Some(session)
  }

  pub fn remove(&self, token: &Uuid) -> bool {
    self.sessions.write().remove(token).is_some()
  }
}
