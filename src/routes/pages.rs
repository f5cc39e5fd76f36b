use askama::Template;
use axum::{
    extract::State,
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;
use crate::{
    config::{RootView, Settings},
    csv_store,
    error::{AppError, AppResult},
    models::RecordTable,
};

// Form for entering an app ID to fetch live reviews
#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate;

// App info table loaded from the info CSV
#[derive(Template)]
#[template(path = "info.html")]
struct InfoTemplate {
    table: RecordTable,
}

// Shared by the page handlers; render failures become a 500
pub(super) fn render<T: Template>(template: T, name: &str) -> AppResult<Html<String>> {
    match template.render() {
        Ok(html) => Ok(Html(html)),
        Err(e) => {
            tracing::error!("Failed to render {} template: {}", name, e);
            Err(AppError::InternalServerError(anyhow::Error::new(e)))
        }
    }
}

// GET / : form or info table, depending on configuration
pub async fn root_page(State(settings): State<Arc<Settings>>) -> AppResult<Response> {
    tracing::info!("[HANDLER] / - Request received (root view: {:?}).", settings.root_view);
    match settings.root_view {
        RootView::Form => Ok(render(IndexTemplate, "index")?.into_response()),
        RootView::Info => info_page(State(settings)).await,
    }
}

// GET /info
pub async fn info_page(State(settings): State<Arc<Settings>>) -> AppResult<Response> {
    let records = csv_store::load_or_empty(&settings.info_csv_path).await;
    tracing::info!("[HANDLER] info - Rendering {} app info records.", records.len());

    let template = InfoTemplate {
        table: RecordTable::from_records(&records),
    };
    Ok(render(template, "info")?.into_response())
}
