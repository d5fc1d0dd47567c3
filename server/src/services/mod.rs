// server/src/services/mod.rs
pub mod auth_service;
pub mod overdue_sweep;
pub mod sessions;

pub use sessions::{Session, SessionStore};
