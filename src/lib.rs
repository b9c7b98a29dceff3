//! Libris Book Catalog and Membership Server
//!
//! A Rust implementation of the Libris catalog server, providing a REST
//! JSON API for managing books, users and the books each user owns,
//! with Open Library as a fallback source for unknown ISBNs.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repository: repository::Repository,
    pub services: Arc<services::Services>,
}
