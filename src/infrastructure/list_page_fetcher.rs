//! List page fetcher
//!
//! Runs the two-step protocol against the listing endpoint: an initial read
//! to recover the server's opaque view state, then a postback that asks the
//! results view to enlarge its page size. When the state cannot be
//! recovered the fetcher degrades to the unmodified first page instead of
//! aborting.

use std::sync::Arc;

use scraper::Html;
use tracing::{info, warn};

use super::config::PortalConfig;
use super::http_client::{FetchError, HttpClient};
use super::pagination::{extract_page_state, extract_total_count, resize_postback_form};

/// Result of one listing fetch cycle.
#[derive(Debug)]
pub struct FetchedListing {
    /// Raw markup of the page holding the result cards.
    pub body: String,

    /// Whether the resize postback was performed. `false` means degraded
    /// mode: the body is the unmodified initial page.
    pub enlarged: bool,

    /// Total result count announced by the page's summary element, when
    /// present and parseable.
    pub total_results: Option<u32>,
}

/// Fetches the tender listing with an enlarged result page.
pub struct ListPageFetcher {
    http: Arc<HttpClient>,
    config: PortalConfig,
}

impl ListPageFetcher {
    pub fn new(http: Arc<HttpClient>, config: PortalConfig) -> Self {
        Self { http, config }
    }

    /// Fetch the listing page, enlarging the result view when possible.
    ///
    /// Transport failures are fatal here; degraded mode only covers a
    /// missing state token.
    pub async fn fetch(&self) -> Result<FetchedListing, FetchError> {
        info!(
            "fetching tender listing ({} results per page)",
            self.config.page_size
        );
        let initial = self.http.get_text(&self.config.list_url).await?;

        let state = {
            // Html is not Send; parse in a scope that ends before the await.
            let document = Html::parse_document(&initial);
            extract_page_state(&document)
        };

        let (body, enlarged) = match state {
            Some(state) => {
                info!("recovered page state ({} bytes), requesting resize", state.len());
                let form = resize_postback_form(&state, self.config.page_size);
                let body = self.http.post_form(&self.config.list_url, &form).await?;
                (body, true)
            }
            None => {
                warn!("page state field not found; continuing with the initial page");
                (initial, false)
            }
        };

        let total_results = {
            let document = Html::parse_document(&body);
            extract_total_count(&document)
        };
        if total_results.is_none() {
            warn!("total result count not announced; skipping capacity reporting");
        }

        Ok(FetchedListing {
            body,
            enlarged,
            total_results,
        })
    }
}
