// server/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use sqlx::postgres::PgPoolOptions;
use std::io;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;

use xihu_server::config::{AppConfig, StorageBackend};
use xihu_server::services::overdue_sweep;
use xihu_server::state::{AppState, Stores};
use xihu_server::web::configure_app_routes;

fn startup_error(context: &str, err: impl std::fmt::Display) -> io::Error {
  tracing::error!(error = %err, "{}", context);
  io::Error::other(format!("{}: {}", context, err))
}

async fn build_stores(config: &AppConfig) -> io::Result<Stores> {
  match config.storage_backend {
    StorageBackend::Memory => {
      tracing::warn!("Using in-memory storage; all data is lost on restart.");
      Ok(Stores::in_memory())
    }
    StorageBackend::Postgres => {
      let url = config
        .database_url
        .as_deref()
        .ok_or_else(|| startup_error("Configuration error", "DATABASE_URL is not set"))?;
      let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(url)
        .await
        .map_err(|e| startup_error("Failed to connect to the database", e))?;
      tracing::info!("Successfully connected to the database.");

      if config.run_migrations {
        sqlx::migrate!("./migrations")
          .run(&pool)
          .await
          .map_err(|e| startup_error("Database migration failed", e))?;
        tracing::info!("Database migrations applied.");
      }
      Ok(Stores::postgres(pool))
    }
  }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
  tracing_subscriber::fmt()
    .with_max_level(Level::INFO)
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting XiHu order server...");

  let app_config = Arc::new(AppConfig::from_env().map_err(|e| startup_error("Configuration error", e))?);
  let stores = build_stores(&app_config).await?;
  let app_state = AppState::new(app_config.clone(), stores);

  overdue_sweep::spawn(app_state.stores.overdue_bills.clone(), app_config.overdue_sweep_interval);

  let server_address = format!("{}:{}", app_config.server_host, app_config.server_port);
  tracing::info!("Attempting to bind server to {}...", server_address);

  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
