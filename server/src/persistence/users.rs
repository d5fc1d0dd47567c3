// server/src/persistence/users.rs

use super::storage_err;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use xihu_core::{LedgerError, LedgerResult};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct User {
  pub id: i64,
  pub username: String,
  #[serde(skip_serializing)] // Never send password hash to client
  pub password_hash: String,
  pub phone: Option<String>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
  pub username: String,
  pub password_hash: String,
  pub phone: Option<String>,
}

#[async_trait]
pub trait UserStore: Send + Sync {
  /// Fails with `Validation` when the username is taken.
  async fn insert(&self, user: NewUser) -> LedgerResult<User>;
  async fn find_by_username(&self, username: &str) -> LedgerResult<Option<User>>;
}

pub struct PgUsers {
  pool: PgPool,
}

impl PgUsers {
  pub fn new(pool: PgPool) -> Self {
    Self { pool }
  }
}

#[async_trait]
impl UserStore for PgUsers {
  async fn insert(&self, user: NewUser) -> LedgerResult<User> {
    let inserted: Option<User> = sqlx::query_as(
      "INSERT INTO users (username, password_hash, phone) VALUES ($1, $2, $3)
       ON CONFLICT (username) DO NOTHING
       RETURNING id, username, password_hash, phone, created_at",
    )
    .bind(&user.username)
    .bind(&user.password_hash)
    .bind(&user.phone)
    .fetch_optional(&self.pool)
    .await
    .map_err(storage_err)?;

    inserted.ok_or_else(|| LedgerError::validation(format!("username '{}' is already taken", user.username)))
  }

  async fn find_by_username(&self, username: &str) -> LedgerResult<Option<User>> {
    sqlx::query_as("SELECT id, username, password_hash, phone, created_at FROM users WHERE username = $1")
      .bind(username)
      .fetch_optional(&self.pool)
      .await
      .map_err(storage_err)
  }
}

#[derive(Default)]
pub struct MemoryUsers {
  users: RwLock<Vec<User>>,
}

impl MemoryUsers {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl UserStore for MemoryUsers {
  async fn insert(&self, user: NewUser) -> LedgerResult<User> {
    let mut users = self.users.write();
    if users.iter().any(|u| u.username == user.username) {
      return Err(LedgerError::validation(format!(
        "username '{}' is already taken",
        user.username
      )));
    }
    let stored = User {
      id: users.len() as i64 + 1,
      username: user.username,
      password_hash: user.password_hash,
      phone: user.phone,
      created_at: Utc::now(),
    };
    users.push(stored.clone());
    Ok(stored)
  }

  async fn find_by_username(&self, username: &str) -> LedgerResult<Option<User>> {
    Ok(self.users.read().iter().find(|u| u.username == username).cloned())
  }
}
