//! Scrape session: fetch → locate → extract → deduplicate
//!
//! The session runs strictly forward. Card-level problems degrade a single
//! record; fetch-level problems abort the listing flow (or skip the single
//! link in the detail flow). Progress and failures surface as log lines.

use std::sync::Arc;

use anyhow::{Context, Result};
use scraper::Html;
use tracing::{debug, info, warn};

use crate::domain::{RejectedRecord, ResultSet};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::http_client::HttpClient;
use crate::infrastructure::list_page_fetcher::{FetchedListing, ListPageFetcher};
use crate::infrastructure::parsing::{
    DetailParseContext, ListParseContext, TenderDetailParser, TenderListParser,
};

/// Outcome of one listing scrape.
#[derive(Debug)]
pub struct ScrapeOutcome {
    pub tenders: ResultSet,

    /// Total result count announced by the portal, when it was parseable.
    pub total_results: Option<u32>,

    /// Whether the enlarged result page was actually obtained.
    pub enlarged: bool,
}

/// One scraping run against the portal. Holds no state between runs.
pub struct ScrapeSession {
    config: AppConfig,
    http: Arc<HttpClient>,
    fetcher: ListPageFetcher,
    list_parser: TenderListParser,
    detail_parser: TenderDetailParser,
}

impl ScrapeSession {
    pub fn new(config: AppConfig) -> Result<Self> {
        let http = Arc::new(
            HttpClient::new(config.http.clone()).context("failed to build HTTP client")?,
        );
        let fetcher = ListPageFetcher::new(Arc::clone(&http), config.portal.clone());
        let list_parser =
            TenderListParser::new(&ListParseContext::new(config.portal.base_url.clone()))?;
        let detail_parser = TenderDetailParser::new()?;

        Ok(Self {
            config,
            http,
            fetcher,
            list_parser,
            detail_parser,
        })
    }

    /// Run the listing flow and return the deduplicated result set.
    pub async fn run(&self) -> Result<ScrapeOutcome> {
        let listing = self.fetcher.fetch().await.context("listing fetch failed")?;
        let outcome = self.collect(&listing);

        if let Some(total) = outcome.total_results {
            info!("portal reports {} total results", total);
        }
        self.report_capacity(&outcome);
        info!("extracted {} unique tenders", outcome.tenders.len());

        Ok(outcome)
    }

    /// Locate cards, run the extraction pipeline and aggregate with
    /// deduplication.
    fn collect(&self, listing: &FetchedListing) -> ScrapeOutcome {
        let document = Html::parse_document(&listing.body);
        let records = self.list_parser.extract_tenders(&document);
        info!("found {} tender cards", records.len());

        let mut tenders = ResultSet::new();
        for record in records {
            match tenders.push(record) {
                Ok(()) => {}
                Err(RejectedRecord::DuplicateReference(reference)) => {
                    warn!("skipping duplicate tender: {}", reference);
                }
                Err(RejectedRecord::MissingIdentity) => {
                    debug!("dropping card with neither reference nor URL");
                }
            }
        }

        ScrapeOutcome {
            tenders,
            total_results: listing.total_results,
            enlarged: listing.enlarged,
        }
    }

    /// Known limitation: results beyond one enlarged page are not fetched.
    fn report_capacity(&self, outcome: &ScrapeOutcome) {
        let page_size = self.config.portal.page_size;
        if let Some(total) = outcome.total_results {
            if total > page_size {
                warn!(
                    "portal reports {} results but at most {} fit one page; \
                     results beyond the first page were not retrieved",
                    total, page_size
                );
            }
        }
    }

    /// Extended mode: fetch each tender's detail page and merge its
    /// label/value rows into the listing record. A failing link is skipped,
    /// the rest of the batch continues. Inter-request spacing is enforced by
    /// the HTTP client's rate limiter.
    pub async fn enrich_with_details(&self, tenders: &mut ResultSet) -> Result<()> {
        let total = tenders.len();
        for (index, record) in tenders.records_mut().iter_mut().enumerate() {
            let Some(url) = record.url().map(str::to_string) else {
                debug!("tender {}/{} has no detail URL; skipping", index + 1, total);
                continue;
            };

            info!("fetching detail page {}/{}", index + 1, total);
            let body = match self.http.get_text(&url).await {
                Ok(body) => body,
                Err(e) => {
                    warn!("skipping detail page {}: {}", url, e);
                    continue;
                }
            };

            let detail = {
                let document = Html::parse_document(&body);
                let context =
                    DetailParseContext::new(url, self.config.portal.base_url.clone());
                self.detail_parser.parse_detail(&document, &context)
            };
            record.merge_missing(detail);
        }
        Ok(())
    }
}
