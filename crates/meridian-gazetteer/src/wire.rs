//! Serde models for the gazetteer service payloads.
//!
//! The geolocation ("locate") service answers with a bare JSON array of
//! feature records; the place-name ("geonames") service wraps its records in
//! an `items` array; the code-definition endpoints wrap theirs in
//! `definitions`. Numeric fields arrive as numbers or quoted strings
//! depending on the service revision, so the numeric fields here accept both.

use serde::{Deserialize, Deserializer};

/// One feature record from the locate service.
///
/// `geometry.coordinates` is GeoJSON order: `[longitude, latitude]`.
#[derive(Debug, Clone, Deserialize)]
pub struct LocateRecord {
    pub title: String,
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
    pub geometry: PointGeometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointGeometry {
    pub coordinates: Vec<f64>,
}

impl LocateRecord {
    pub fn longitude(&self) -> Option<f64> {
        self.geometry.coordinates.first().copied()
    }

    pub fn latitude(&self) -> Option<f64> {
        self.geometry.coordinates.get(1).copied()
    }
}

/// Envelope of a place-name search response.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNameResult {
    #[serde(default)]
    pub items: Vec<NameRecord>,
}

/// One candidate from the place-name service.
#[derive(Debug, Clone, Deserialize)]
pub struct NameRecord {
    pub name: String,
    #[serde(default)]
    pub location: Option<String>,
    pub province: CodeRef,
    pub concise: CodeRef,
    #[serde(deserialize_with = "lenient_f64")]
    pub latitude: f64,
    #[serde(deserialize_with = "lenient_f64")]
    pub longitude: f64,
    #[serde(default)]
    pub bbox: Option<Vec<f64>>,
}

/// A `{ "code": ... }` reference. Codes are numeric for provinces and
/// alphabetic for concise types; both are carried as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct CodeRef {
    #[serde(deserialize_with = "lenient_string")]
    pub code: String,
}

/// Envelope of a code-definition response.
#[derive(Debug, Clone, Deserialize)]
pub struct DefinitionList {
    #[serde(default)]
    pub definitions: Vec<Definition>,
}

/// One `code -> term/description` entry from a definition endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Definition {
    #[serde(deserialize_with = "lenient_string")]
    pub code: String,
    pub term: String,
    #[serde(default)]
    pub description: Option<String>,
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Integer(i64),
        Float(f64),
    }

    Ok(match StringOrNumber::deserialize(deserializer)? {
        StringOrNumber::String(s) => s,
        StringOrNumber::Integer(i) => i.to_string(),
        StringOrNumber::Float(f) => f.to_string(),
    })
}
