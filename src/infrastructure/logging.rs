//! Logging initialization
//!
//! Console logging through tracing-subscriber. The core extraction code
//! reports progress exclusively through `tracing` macros, so the subscriber
//! installed here is the only place output streams are touched.

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence when set; otherwise `verbose` switches
/// between `debug` and `info` for this crate.
pub fn init_logging(verbose: bool) -> Result<()> {
    let default_directive = if verbose {
        "adm_tenders=debug,info"
    } else {
        "adm_tenders=info,warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()?;

    Ok(())
}
