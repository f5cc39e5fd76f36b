// Application settings, loaded with the 'config' crate and 'dotenv'

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_INFO_CSV_PATH: &str =
    "BankDigital/dataset/info_BANK_MOBILE_GOOGLE_PLAY_Update21092024.csv";
pub const DEFAULT_REVIEWS_CSV_PATH: &str =
    "BankDigital/dataset/reviews_BANK_MOBILE_GOOGLE_PLAY_Update21092024.csv";

// What GET / renders: the app ID form (live fetch) or the CSV-backed app info table
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RootView {
    Form,
    Info,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server_address: String,
    pub debug: bool,
    pub root_view: RootView,
    pub info_csv_path: PathBuf,
    pub reviews_csv_path: PathBuf,
    // Base URL of the review source; overridden in tests
    pub play_store_url: String,
    pub static_dir: PathBuf,
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let builder = Config::builder()
            .set_default("server_address", "127.0.0.1:5000")?
            .set_default("debug", true)?
            .set_default("root_view", "form")?
            .set_default("info_csv_path", DEFAULT_INFO_CSV_PATH)?
            .set_default("reviews_csv_path", DEFAULT_REVIEWS_CSV_PATH)?
            .set_default("play_store_url", "https://play.google.com")?
            .set_default("static_dir", "static")?
            // Load from a configuration file (e.g., config.toml)
            .add_source(File::with_name("config").required(false))
            // Load from environment variables (e.g., APP__ROOT_VIEW=info)
            .add_source(Environment::with_prefix("APP").separator("__"));

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    // Default log filter when RUST_LOG is not set
    pub fn default_log_filter(&self) -> String {
        let level = if self.debug { "debug" } else { "info" };
        format!("bankdigital_reviews={level},tower_http={level}")
    }
}

#[cfg(test)]
impl Settings {
    // Settings pointing at explicit files, independent of the environment
    pub fn for_paths(info_csv_path: PathBuf, reviews_csv_path: PathBuf, root_view: RootView) -> Self {
        Settings {
            server_address: "127.0.0.1:0".to_string(),
            debug: true,
            root_view,
            info_csv_path,
            reviews_csv_path,
            play_store_url: "http://127.0.0.1:9".to_string(),
            static_dir: PathBuf::from("static"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_view_deserializes_lowercase() {
        let view: RootView = serde_json::from_str("\"info\"").unwrap();
        assert_eq!(view, RootView::Info);
        let view: RootView = serde_json::from_str("\"form\"").unwrap();
        assert_eq!(view, RootView::Form);
        assert!(serde_json::from_str::<RootView>("\"table\"").is_err());
    }

    #[test]
    fn log_filter_follows_debug_flag() {
        let mut settings = Settings::for_paths("a.csv".into(), "b.csv".into(), RootView::Form);
        assert_eq!(settings.default_log_filter(), "bankdigital_reviews=debug,tower_http=debug");
        settings.debug = false;
        assert_eq!(settings.default_log_filter(), "bankdigital_reviews=info,tower_http=info");
    }
}
