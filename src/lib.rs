//! Library catalog server
//!
//! REST JSON API over a catalog of authors, categories and books, with
//! criteria filtering, pagination and a public read-only browsing facade.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod criteria;
pub mod error;
pub mod filter;
pub mod models;
pub mod pagination;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
