//! Remote service boundary for the Meridian query router.
//!
//! This crate owns everything that touches the wire: the typed clients for
//! the geolocation ("locate"), place-name ("geonames") and code-definition
//! services, and the serde models of their payloads. The router core depends
//! only on the [`GazetteerApi`] trait, so tests and alternative backends can
//! stand in for the HTTP client.
//!
//! ```rust,no_run
//! use meridian_gazetteer::{GazetteerApi, GeogratisClient, Language, NameSearchParams};
//!
//! # async fn demo() -> Result<(), meridian_gazetteer::GazetteerError> {
//! let client = GeogratisClient::new(Language::English);
//!
//! // Structured-code lookup
//! let sheets = client.locate("064D06").await?;
//!
//! // Free-text place-name search
//! let params = NameSearchParams::by_text("Milton", 20);
//! let places = client.find_names(&params).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod error;
mod wire;

pub use client::{Endpoints, GazetteerApi, GeogratisClient, Language, NameSearchParams};
pub use error::{GazetteerError, Result};
pub use wire::{CodeRef, Definition, DefinitionList, LocateRecord, NameRecord, PointGeometry, RawNameResult};
