//! Infrastructure layer: HTTP, pagination protocol, parsing, and output
//!
//! Everything that touches the network, the portal's markup, or the
//! filesystem lives here, behind the domain types.

pub mod config;
pub mod http_client;
pub mod list_page_fetcher;
pub mod logging;
pub mod output;
pub mod pagination;
pub mod parsing;

// Re-export commonly used items
pub use config::{AppConfig, OutputConfig, PortalConfig, defaults};
pub use http_client::{FetchError, HttpClient, HttpClientConfig};
pub use list_page_fetcher::{FetchedListing, ListPageFetcher};
pub use logging::init_logging;
pub use output::{build_export, write_csv, write_json};
pub use pagination::PageState;
pub use parsing::{
    DetailParseContext, ListParseContext, ParsingError, ParsingResult, TenderDetailParser,
    TenderListParser, clean_text,
};
