use anyhow::{Context, Result};
use axum::{extract::FromRef, Router};
use reqwest::Client;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use crate::config::Settings;
use crate::review_fetcher::{GooglePlayFetcher, ReviewFetcher};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, fmt};

// Declare modules
mod config;
mod csv_store;
mod error;
mod models;
mod review_fetcher;
mod routes;

// Shared per-process state; nothing in it is mutated after startup
#[derive(Clone, FromRef)]
struct AppState {
    settings: Arc<Settings>,
    review_fetcher: Arc<dyn ReviewFetcher>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first so the debug flag can pick the log level
    let settings = config::Settings::new().context("Failed to load configuration")?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| settings.default_log_filter().into()))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Initializing bank review server...");
    tracing::debug!(?settings, "Configuration loaded.");
    if !settings.info_csv_path.exists() || !settings.reviews_csv_path.exists() {
        tracing::warn!(
            info = %settings.info_csv_path.display(),
            reviews = %settings.reviews_csv_path.display(),
            "CSV dataset incomplete; CSV views will render empty until the scraping script has run."
        );
    }

    let http_client = Client::builder()
        .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/114.0.0.0 Safari/537.36")
        .build()
        .context("Failed to build reqwest client")?;

    let fetcher = GooglePlayFetcher::new(http_client, settings.play_store_url.as_str());

    let app_state = AppState {
        settings: Arc::new(settings),
        review_fetcher: Arc::new(fetcher),
    };

    let app: Router = routes::create_router(app_state.clone())
        .nest_service("/static", ServeDir::new(&app_state.settings.static_dir))
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = app_state
        .settings
        .server_address
        .parse()
        .with_context(|| format!("Invalid server address format: {}", app_state.settings.server_address))?;

    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => {
            tracing::info!("Server listening on {}", addr);
            l
        }
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
