// Route definitions

use axum::{
    routing::{get, post},
    Router,
};
use crate::AppState;

mod export;
mod pages;
mod reviews;

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::root_page))
        .route("/info", get(pages::info_page))
        .route("/fetch-reviews", post(reviews::fetch_reviews))
        .route("/reviews", get(reviews::reviews_page))
        .route("/export/info", get(export::export_info))
        .route("/export/reviews", get(export::export_reviews))
        .with_state(app_state)
}
