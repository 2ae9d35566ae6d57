//! Meridian - Geographic Query Routing Library
//!
//! Meridian turns free-text input into structured geographic queries and
//! resolves them against Canadian gazetteer services. A single piece of text
//! is classified as an NTS grid reference, a postal code, a coordinate pair
//! or a generic place name; each variant validates and normalizes itself and
//! resolves asynchronously into one uniform result model.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use meridian::{GeoSearcher, SearchConfig};
//!
//! # async fn demo() -> meridian::Result<()> {
//! let searcher = GeoSearcher::new(SearchConfig::default());
//! searcher.init().await?;
//!
//! // One-shot: classify and resolve in a single call
//! let hits = searcher.search_once("064D06").await?;
//!
//! // Interactive: a session supersedes stale lookups as the user types
//! let session = searcher.session().await?;
//! let mut updates = session.subscribe();
//! session.search("Milton");
//! updates.changed().await.ok();
//! for hit in &updates.borrow().results {
//!     println!("{} ({})", hit.name, hit.origin);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Query Variants
//!
//! - **NTS**: `064D06` looks up a National Topographic System map sheet;
//!   `064D` alone is incomplete and is rejected without a lookup.
//! - **Postal**: `L5L 2R7` resolves through the geolocation service; a bare
//!   FSA (`L5L`) is rejected.
//! - **Coordinates**: `45.4, -75.7` (or DMS triplets) echo the point and
//!   list named places around it.
//! - **Place names**: everything else runs a fuzzy place-name search with
//!   province/extent/type filtering.
//!
//! Classification is pure and deterministic; resolution is cooperative
//! async with logical cancellation — a superseded lookup completes and is
//! ignored.

use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod classify;
mod config;
mod core;
pub mod error;
mod model;
mod query;
mod registry;
mod search;
#[cfg(test)]
pub(crate) mod testing;

pub use crate::core::GeoSearcher;

pub use classify::classify;
pub use config::{SearchConfig, SearchConfigBuilder};
pub use error::{MeridianError, Result};
pub use meridian_gazetteer as gazetteer;
pub use meridian_gazetteer::{Endpoints, GazetteerApi, GazetteerError, GeogratisClient, Language};
pub use model::{Extent, GeoPoint, InvalidCoordinate, QueryOrigin, SearchHit};
pub use query::{
    ClassifiedQuery, CoordinateNotation, CoordinateQuery, FsaQuery, NameQuery, NtsQuery, QueryKind,
    QueryRejection, ResolveContext, ResolveError,
};
pub use registry::{
    Province, ProvinceRegistry, ProvinceStore, TypeRegistry, TypeStore, fsa_to_province_abbrs,
};
pub use search::{SearchFilters, SearchSession, SessionSnapshot, SessionState};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for the Meridian library.
///
/// This sets up structured logging with configurable levels and filtering.
/// Call this once at the start of your application to enable detailed
/// logging output from Meridian operations.
///
/// # Arguments
///
/// * `level` - The minimum log level to display
///
/// # Examples
///
/// ```rust
/// use meridian::init_logging;
/// use tracing::Level;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), meridian::MeridianError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static ()> {
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.into().to_string()))?
            .add_directive("hyper_util=warn".parse().expect("static directive"))
            .add_directive("reqwest=warn".parse().expect("static directive"));

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .init();
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup_test_env() {
        let _ = init_logging(tracing::Level::WARN);
    }

    #[test]
    fn test_classification_smoke() {
        setup_test_env();

        assert_eq!(classify("064D06").origin(), QueryOrigin::Nts);
        assert_eq!(classify("L5L 2R7").origin(), QueryOrigin::Fsa);
        assert_eq!(classify("45.4, -75.7").origin(), QueryOrigin::Coordinate);
        assert_eq!(classify("Milton").origin(), QueryOrigin::Generic);
    }

    #[test]
    fn test_default_config() {
        setup_test_env();

        let config = SearchConfig::default();
        assert_eq!(config.language, Language::English);
        assert_eq!(config.max_results, 100);
    }

    #[test]
    fn test_logging_initializes_once() {
        setup_test_env();
        assert!(init_logging(tracing::Level::INFO).is_ok());
    }
}
