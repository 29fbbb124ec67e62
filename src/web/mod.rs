//! HTTP surface: the form page at `/` and the JSON endpoint `/api/predict`.

pub mod handlers;
pub mod pages;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};

use crate::ml::Predictor;
use pages::PageRenderer;

/// Everything a request needs, built once at startup and never mutated.
pub struct AppContext {
    pub predictor: Predictor,
    pub pages: PageRenderer,
}

impl AppContext {
    pub fn new(predictor: Predictor) -> Result<Self, minijinja::Error> {
        Ok(Self {
            predictor,
            pages: PageRenderer::new()?,
        })
    }
}

pub fn router(context: Arc<AppContext>) -> Router {
    Router::new()
        .route("/", get(handlers::index).post(handlers::classify_form))
        .route("/api/predict", post(handlers::api_predict))
        .with_state(context)
}
