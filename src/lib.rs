//! Rentdesk Rental Inventory Server
//!
//! A Rust implementation of the Rentdesk rental inventory availability and
//! booking engine, providing a REST JSON API for device catalogs, availability
//! queries, atomic checkouts, subscription billing rollover, and a live change
//! feed for connected clients.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod interval;
pub mod models;
pub mod repository;
pub mod services;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub changefeed: Arc<services::changefeed::ChangeFeedRouter>,
}
