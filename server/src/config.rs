// server/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
  Postgres,
  /// Everything in process memory; data is lost on restart.
  Memory,
}

impl FromStr for StorageBackend {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "postgres" | "pg" => Ok(StorageBackend::Postgres),
      "memory" | "mem" => Ok(StorageBackend::Memory),
      other => Err(AppError::Config(format!("Unknown STORAGE_BACKEND '{}'", other))),
    }
  }
}

/// Upper bound for `SESSION_TTL_HOURS`: one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

fn check_session_ttl(hours: i64) -> Result<i64> {
  if hours <= 0 {
    return Err(AppError::Config("SESSION_TTL_HOURS must be positive".to_string()));
  }
  if hours > MAX_SESSION_TTL_HOURS {
    return Err(AppError::Config(format!(
      "SESSION_TTL_HOURS must be at most {}",
      MAX_SESSION_TTL_HOURS
    )));
  }
  Ok(hours)
}

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  pub storage_backend: StorageBackend,
  /// Required when `storage_backend` is `Postgres`.
  pub database_url: Option<String>,
  pub run_migrations: bool,
  pub session_cookie_name: String,
  pub session_ttl_hours: i64,
  pub overdue_sweep_interval: Duration,
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| {
      env::var(var_name).map_err(|e| AppError::Config(format!("Missing environment variable '{}': {}", var_name, e)))
    };

    let server_host = get_env("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
    let server_port = get_env("SERVER_PORT")
      .unwrap_or_else(|_| "8080".to_string())
      .parse::<u16>()
      .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?;
    let storage_backend = get_env("STORAGE_BACKEND")
      .unwrap_or_else(|_| "postgres".to_string())
      .parse::<StorageBackend>()?;
    let database_url = match storage_backend {
      StorageBackend::Postgres => Some(get_env("DATABASE_URL")?),
      StorageBackend::Memory => get_env("DATABASE_URL").ok(),
    };
    let run_migrations = get_env("RUN_MIGRATIONS")
      .unwrap_or_else(|_| "false".to_string())
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid RUN_MIGRATIONS value: {}", e)))?;
    let session_cookie_name = get_env("SESSION_COOKIE_NAME").unwrap_or_else(|_| "XIHU_SESSION".to_string());
    let session_ttl_hours = get_env("SESSION_TTL_HOURS")
      .unwrap_or_else(|_| "24".to_string())
      .parse::<i64>()
      .map_err(|e| AppError::Config(format!("Invalid SESSION_TTL_HOURS: {}", e)))
      .and_then(check_session_ttl)?;
    let overdue_sweep_interval = get_env("OVERDUE_SWEEP_INTERVAL_SECS")
      .unwrap_or_else(|_| "86400".to_string())
      .parse::<u64>()
      .map(Duration::from_secs)
      .map_err(|e| AppError::Config(format!("Invalid OVERDUE_SWEEP_INTERVAL_SECS: {}", e)))?;

    if overdue_sweep_interval.is_zero() {
      return Err(AppError::Config("OVERDUE_SWEEP_INTERVAL_SECS must be positive".to_string()));
    }

    tracing::info!(backend = ?storage_backend, "Application configuration loaded successfully.");

    Ok(Self {
      server_host,
      server_port,
      storage_backend,
      database_url,
      run_migrations,
      session_cookie_name,
      session_ttl_hours,
      overdue_sweep_interval,
    })
  }

  /// Memory backend with default settings, for tests and local demos.
  pub fn in_memory() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      storage_backend: StorageBackend::Memory,
      database_url: None,
      run_migrations: false,
      session_cookie_name: "XIHU_SESSION".to_string(),
      session_ttl_hours: 24,
      overdue_sweep_interval: Duration::from_secs(86_400),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn session_ttl_must_be_within_bounds() {
    assert_eq!(check_session_ttl(24).unwrap(), 24);
    assert_eq!(check_session_ttl(MAX_SESSION_TTL_HOURS).unwrap(), MAX_SESSION_TTL_HOURS);
    assert!(matches!(check_session_ttl(0), Err(AppError::Config(_))));
    assert!(matches!(check_session_ttl(-3), Err(AppError::Config(_))));
    assert!(matches!(check_session_ttl(10_i64.pow(16)), Err(AppError::Config(_))));
  }

  #[test]
  fn storage_backend_names_are_case_insensitive() {
    assert_eq!("PG".parse::<StorageBackend>().unwrap(), StorageBackend::Postgres);
    assert_eq!(" memory ".parse::<StorageBackend>().unwrap(), StorageBackend::Memory);
    assert!(matches!("sqlite".parse::<StorageBackend>(), Err(AppError::Config(_))));
  }
}
