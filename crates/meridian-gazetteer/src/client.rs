//! Service clients for the gazetteer endpoints.
//!
//! [`GazetteerApi`] is the boundary the query router talks to; the shipped
//! implementation, [`GeogratisClient`], speaks HTTP to the geogratis
//! geolocation and geoname services. Alternative backends (or test fakes)
//! implement the same trait.

use std::fmt;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};
use url::Url;

use crate::{
    error::{GazetteerError, Result},
    wire::{Definition, DefinitionList, LocateRecord, NameRecord, RawNameResult},
};

const LOCATE_URL: &str = "https://geogratis.gc.ca/services/geolocation/@{language}/locate";
const GEONAMES_URL: &str = "https://geogratis.gc.ca/services/geoname/@{language}/geonames.json";
const TYPE_CODES_URL: &str = "https://geogratis.gc.ca/services/geoname/@{language}/codes/concise.json";
const PROVINCE_CODES_URL: &str = "https://geogratis.gc.ca/services/geoname/@{language}/codes/province.json";

/// Service language. The gazetteer endpoints are partitioned by language
/// path segment, and code definitions differ between the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Language {
    #[default]
    English,
    French,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::English => "en",
            Self::French => "fr",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = GazetteerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "english" => Ok(Self::English),
            "fr" | "french" => Ok(Self::French),
            other => Err(GazetteerError::Payload(format!(
                "unknown language code '{other}'"
            ))),
        }
    }
}

/// URL templates for the four services. Templates carry an `@{language}`
/// placeholder substituted at request time.
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub locate: String,
    pub geonames: String,
    pub type_codes: String,
    pub province_codes: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            locate: LOCATE_URL.to_string(),
            geonames: GEONAMES_URL.to_string(),
            type_codes: TYPE_CODES_URL.to_string(),
            province_codes: PROVINCE_CODES_URL.to_string(),
        }
    }
}

impl Endpoints {
    fn resolve(template: &str, language: Language) -> Result<Url> {
        Ok(Url::parse(
            &template.replace("@{language}", language.as_str()),
        )?)
    }
}

/// Parameters of a place-name search.
///
/// Exactly one of `text` or `position` drives the lookup; the service
/// rejects a bounding box combined with a position, so callers post-filter
/// by extent on positional searches.
#[derive(Debug, Clone, Default)]
pub struct NameSearchParams {
    pub text: Option<String>,
    /// `(latitude, longitude)` for nearby-name lookups.
    pub position: Option<(f64, f64)>,
    pub max_results: u32,
    /// `[west, south, east, north]` in decimal degrees.
    pub bbox: Option<[f64; 4]>,
    pub province: Option<String>,
    /// Concise type codes the service should include (empty = all).
    pub categories: Vec<String>,
    /// Restrict to official names (`category=O`).
    pub official_only: bool,
}

impl NameSearchParams {
    pub fn by_text(text: impl Into<String>, max_results: u32) -> Self {
        Self {
            text: Some(text.into()),
            max_results,
            ..Self::default()
        }
    }

    pub fn by_position(latitude: f64, longitude: f64, max_results: u32) -> Self {
        Self {
            position: Some((latitude, longitude)),
            max_results,
            ..Self::default()
        }
    }

    /// Query-string pairs in the order the service documents them.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();

        if let Some((lat, lon)) = self.position {
            pairs.push(("lat", lat.to_string()));
            pairs.push(("lon", lon.to_string()));
        } else if let Some(text) = &self.text {
            pairs.push(("q", text.clone()));
        }
        pairs.push(("num", self.max_results.to_string()));

        // bbox is only legal on textual searches
        if self.position.is_none() {
            if let Some(bbox) = self.bbox {
                pairs.push(("bbox", bbox.map(|c| c.to_string()).join(",")));
            }
        }
        if let Some(province) = &self.province {
            pairs.push(("province", province.clone()));
        }
        if !self.categories.is_empty() {
            pairs.push(("concise", self.categories.join(",")));
        }
        if self.official_only {
            pairs.push(("category", "O".to_string()));
        }

        pairs
    }
}

/// The remote lookup boundary of the query router.
#[async_trait]
pub trait GazetteerApi: Send + Sync {
    /// Look a structured code (NTS reference, postal code) up in the
    /// geolocation service. Zero records is a normal outcome.
    async fn locate(&self, code: &str) -> Result<Vec<LocateRecord>>;

    /// Search the place-name service by text or position.
    async fn find_names(&self, params: &NameSearchParams) -> Result<Vec<NameRecord>>;

    /// Concise type-code definitions for a language.
    async fn type_definitions(&self, language: Language) -> Result<Vec<Definition>>;

    /// Province definitions for a language.
    async fn province_definitions(&self, language: Language) -> Result<Vec<Definition>>;
}

/// HTTP implementation of [`GazetteerApi`] against the geogratis services.
#[derive(Debug, Clone)]
pub struct GeogratisClient {
    http: Client,
    endpoints: Endpoints,
    language: Language,
}

impl GeogratisClient {
    pub fn new(language: Language) -> Self {
        Self::with_endpoints(Endpoints::default(), language)
    }

    pub fn with_endpoints(endpoints: Endpoints, language: Language) -> Self {
        Self {
            http: Client::new(),
            endpoints,
            language,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// GET a URL and decode its JSON body. The body is fetched as text and
    /// decoded separately so a bad payload surfaces as `Malformed` rather
    /// than a transport error.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!(%url, "gazetteer request");
        let response = self.http.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl GazetteerApi for GeogratisClient {
    #[instrument(name = "Locate", level = "debug", skip(self))]
    async fn locate(&self, code: &str) -> Result<Vec<LocateRecord>> {
        let mut url = Endpoints::resolve(&self.endpoints.locate, self.language)?;
        url.query_pairs_mut().append_pair("q", code);
        self.get_json(url).await
    }

    #[instrument(name = "Find Names", level = "debug", skip_all)]
    async fn find_names(&self, params: &NameSearchParams) -> Result<Vec<NameRecord>> {
        let mut url = Endpoints::resolve(&self.endpoints.geonames, self.language)?;
        for (key, value) in params.to_query_pairs() {
            url.query_pairs_mut().append_pair(key, &value);
        }
        let raw: RawNameResult = self.get_json(url).await?;
        Ok(raw.items)
    }

    #[instrument(name = "Type Definitions", level = "debug", skip(self))]
    async fn type_definitions(&self, language: Language) -> Result<Vec<Definition>> {
        let url = Endpoints::resolve(&self.endpoints.type_codes, language)?;
        let list: DefinitionList = self.get_json(url).await?;
        Ok(list.definitions)
    }

    #[instrument(name = "Province Definitions", level = "debug", skip(self))]
    async fn province_definitions(&self, language: Language) -> Result<Vec<Definition>> {
        let url = Endpoints::resolve(&self.endpoints.province_codes, language)?;
        let list: DefinitionList = self.get_json(url).await?;
        Ok(list.definitions)
    }
}
