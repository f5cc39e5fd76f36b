use anyhow::Context;
use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use std::{path::Path, sync::Arc};
use tokio_util::io::ReaderStream;
use crate::{
    config::Settings,
    error::{AppError, AppResult},
};

const INFO_MISSING: &str = "App info CSV not found. Please run the scraping script first.";
const REVIEWS_MISSING: &str = "Reviews CSV not found. Please run the scraping script first.";

// GET /export/info
pub async fn export_info(State(settings): State<Arc<Settings>>) -> AppResult<Response> {
    tracing::info!("[HANDLER] /export/info - Request received.");
    send_csv(&settings.info_csv_path, INFO_MISSING).await
}

// GET /export/reviews
pub async fn export_reviews(State(settings): State<Arc<Settings>>) -> AppResult<Response> {
    tracing::info!("[HANDLER] /export/reviews - Request received.");
    send_csv(&settings.reviews_csv_path, REVIEWS_MISSING).await
}

// Streams a CSV file from disk as an attachment
async fn send_csv(path: &Path, missing_message: &str) -> AppResult<Response> {
    if !path.exists() {
        return Err(AppError::NotFound(missing_message.to_string()));
    }

    let file = open_regular_file(path).await.map_err(AppError::ExportFailed)?;
    let filename = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("export.csv");

    tracing::debug!(path = %path.display(), "Streaming CSV export");
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{}\"", filename)),
    ];
    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

async fn open_regular_file(path: &Path) -> anyhow::Result<tokio::fs::File> {
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let metadata = file
        .metadata()
        .await
        .with_context(|| format!("Failed to stat {}", path.display()))?;
    anyhow::ensure!(metadata.is_file(), "{} is not a regular file", path.display());
    Ok(file)
}
