//! Local library catalog server
//!
//! Server-rendered pages for managing a library catalog: authors, genres,
//! books and their physical copies.

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod presentation;
pub mod repository;
pub mod services;
pub mod validation;
pub mod views;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
    pub views: Arc<views::Views>,
}

impl AppState {
    pub fn new(config: AppConfig, repository: repository::Repository) -> AppResult<Self> {
        Ok(Self {
            config: Arc::new(config),
            services: Arc::new(services::Services::new(repository)),
            views: Arc::new(views::Views::new()?),
        })
    }
}
