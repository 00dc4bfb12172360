//! Tender detail page parser
//!
//! Detail pages render tender attributes as two-column table rows. Every
//! label/value row is harvested into a flat record keyed by the label text,
//! which makes the per-record schema even less predictable than the listing
//! extractor's; emission relies on the same union-of-fieldnames strategy.

use scraper::{Html, Selector};
use tracing::debug;

use super::context::DetailParseContext;
use super::error::{ParsingError, ParsingResult};
use super::text::clean_text;
use crate::domain::tender::{TenderRecord, fields};

/// Parser for individual tender detail pages.
pub struct TenderDetailParser {
    row_selector: Selector,
    cell_selector: Selector,
}

impl TenderDetailParser {
    pub fn new() -> ParsingResult<Self> {
        Ok(Self {
            row_selector: compile("table tr")?,
            cell_selector: compile("td")?,
        })
    }

    /// Read every two-column table row as a label/value pair.
    ///
    /// Rows with any other column count are layout scaffolding and are
    /// skipped, as are rows whose label cleans to an empty string. The
    /// record always opens with the page URL so it can stand on its own.
    pub fn parse_detail(&self, html: &Html, context: &DetailParseContext) -> TenderRecord {
        let mut record = TenderRecord::new();
        record.insert(fields::URL, context.url.clone());

        let mut rows = 0usize;
        for row in html.select(&self.row_selector) {
            let cells: Vec<_> = row.select(&self.cell_selector).collect();
            if cells.len() != 2 {
                continue;
            }

            let label = clean_text(&cells[0].text().collect::<String>());
            if label.is_empty() {
                continue;
            }
            let value = clean_text(&cells[1].text().collect::<String>());
            record.insert(label, value);
            rows += 1;
        }

        debug!("extracted {} detail rows from {}", rows, context.url);
        record
    }
}

fn compile(selector: &str) -> ParsingResult<Selector> {
    Selector::parse(selector).map_err(|e| ParsingError::invalid_selector(selector, e))
}
