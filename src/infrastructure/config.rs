//! Configuration infrastructure
//!
//! Application configuration with serde-backed defaults and optional JSON
//! file loading. Every setting has a default carrying the portal constants,
//! so a config file only needs the keys it overrides.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::info;

use super::http_client::HttpClientConfig;

/// Portal constants and tuning defaults.
pub mod defaults {
    pub const BASE_URL: &str = "https://achats.adm.co.ma/";
    pub const LIST_URL: &str =
        "https://achats.adm.co.ma/?page=entreprise.EntrepriseAdvancedSearch&AllCons&searchAnnCons";

    /// Enlarged result-page size requested through the resize postback.
    pub const PAGE_SIZE: u32 = 500;

    pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";
    pub const ACCEPT_LANGUAGE: &str = "fr-FR,fr;q=0.9";
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    /// One request per second toward the portal host.
    pub const MAX_REQUESTS_PER_SECOND: u32 = 1;
    pub const MAX_RETRIES: u32 = 3;
    pub const RETRY_BASE_DELAY_MS: u64 = 1000;

    pub const CSV_OUTPUT: &str = "adm_tenders.csv";
    pub const JSON_OUTPUT: &str = "adm_tenders.json";
}

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub portal: PortalConfig,
    pub http: HttpClientConfig,
    pub output: OutputConfig,
}

/// Which portal to scrape and how large a result page to request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortalConfig {
    /// Base URL used to resolve the relative detail links.
    pub base_url: String,

    /// Listing endpoint, also the target of the resize postback.
    pub list_url: String,

    /// Result-page size requested through the postback.
    pub page_size: u32,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::BASE_URL.to_string(),
            list_url: defaults::LIST_URL.to_string(),
            page_size: defaults::PAGE_SIZE,
        }
    }
}

/// Output file destinations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub csv_path: PathBuf,
    pub json_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from(defaults::CSV_OUTPUT),
            json_path: PathBuf::from(defaults::JSON_OUTPUT),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file.
    pub async fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config file {}", path.display()))?;
        info!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Load from a file when one is given, otherwise use the defaults.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path).await,
            None => Ok(Self::default()),
        }
    }
}
