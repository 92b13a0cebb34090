//! Local Library catalog server
//!
//! Request handlers for a library catalog: authors, books, genres and the
//! physical copies of books. Every handler runs the same pipeline (fetch
//! in parallel, validate, re-render or persist, redirect) and ends in a
//! view rendered by a pluggable [`views::ViewRenderer`].

use std::sync::Arc;

use axum::response::Response;

pub mod api;
pub mod config;
pub mod error;
pub mod fetch;
pub mod models;
pub mod pipeline;
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
    pub renderer: Arc<dyn views::ViewRenderer>,
}

impl AppState {
    pub fn new(config: AppConfig, repository: repository::Repository) -> Self {
        Self {
            config: Arc::new(config),
            services: Arc::new(services::Services::new(repository)),
            renderer: Arc::new(views::JsonRenderer),
        }
    }

    /// Turn a handler outcome into a response with the configured renderer
    pub fn respond(&self, outcome: views::Outcome) -> AppResult<Response> {
        views::respond(self.renderer.as_ref(), outcome)
    }
}
