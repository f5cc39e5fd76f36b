// Handlers for the two review views: live fetch and CSV snapshot

use askama::Template;
use axum::{
    extract::{Form, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use crate::{
    config::Settings,
    csv_store,
    error::AppResult,
    models::{FetchReviewsForm, Record, RecordTable, ReviewQuery},
    review_fetcher::ReviewFetcher,
};
use super::pages::render;

#[derive(Template)]
#[template(path = "reviews.html")]
struct ReviewsTemplate {
    heading: String,
    table: RecordTable,
}

// POST /fetch-reviews
pub async fn fetch_reviews(
    State(fetcher): State<Arc<dyn ReviewFetcher>>,
    form: Option<Form<FetchReviewsForm>>,
) -> AppResult<Response> {
    let app_id = form
        .and_then(|Form(form)| form.app_id)
        .filter(|id| !id.is_empty());

    let Some(app_id) = app_id else {
        tracing::info!("[HANDLER] /fetch-reviews - No app_id submitted, redirecting to /.");
        return Ok((StatusCode::FOUND, [(header::LOCATION, "/")]).into_response());
    };

    tracing::info!("[HANDLER] /fetch-reviews - Fetching reviews for app_id: {}", app_id);
    let query = ReviewQuery::new(app_id.as_str());

    // The continuation token is dropped: only the first page is shown
    let records: Vec<Record> = match fetcher.fetch_reviews(&query).await {
        Ok((reviews, _)) => reviews.into_iter().map(|r| r.into_record()).collect(),
        Err(e) => {
            tracing::error!("[HANDLER] /fetch-reviews - Error fetching reviews for {}: {:?}", app_id, e);
            Vec::new()
        }
    };

    let template = ReviewsTemplate {
        heading: format!("Reviews for {}", app_id),
        table: RecordTable::from_records(&records),
    };
    Ok(render(template, "reviews")?.into_response())
}

// GET /reviews
pub async fn reviews_page(State(settings): State<Arc<Settings>>) -> AppResult<Response> {
    let records = csv_store::load_or_empty(&settings.reviews_csv_path).await;
    tracing::info!("[HANDLER] /reviews - Rendering {} reviews from CSV.", records.len());

    let template = ReviewsTemplate {
        heading: "Reviews (CSV snapshot)".to_string(),
        table: RecordTable::from_records(&records),
    };
    Ok(render(template, "reviews")?.into_response())
}
