// server/src/lib.rs

//! HTTP front end of the XiHu unified order ledger.

pub mod config;
pub mod errors;
pub mod persistence;
pub mod services;
pub mod state;
pub mod web;

pub use crate::config::{AppConfig, StorageBackend};
pub use crate::errors::{AppError, Result};
pub use crate::state::{AppState, Stores};
