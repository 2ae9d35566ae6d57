//! The normalized result model shared by every query variant.
//!
//! Whatever variant produced it, a hit always carries a validated
//! decimal-degree point; the optional extent, when present, contains that
//! point. Mappers enforce both at construction, so downstream consumers
//! never re-check.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// A coordinate rejected by [`GeoPoint::new`].
#[derive(Error, Debug, Clone, PartialEq)]
#[error("coordinate out of range: latitude {latitude}, longitude {longitude}")]
pub struct InvalidCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

/// A geographic point in decimal degrees.
///
/// Both components are guaranteed finite and within Earth ranges
/// (latitude in [-90, 90], longitude in [-180, 180]).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, InvalidCoordinate> {
        if latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude)
        {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(InvalidCoordinate {
                latitude,
                longitude,
            })
        }
    }

    pub fn latitude(self) -> f64 {
        self.latitude
    }

    pub fn longitude(self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// A bounding rectangle in decimal degrees, `[west, south, east, north]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Extent {
    pub west: f64,
    pub south: f64,
    pub east: f64,
    pub north: f64,
}

impl Extent {
    /// Build from a service `bbox` array. Returns `None` unless the array
    /// has exactly four finite, properly ordered components.
    pub fn from_bbox(bbox: &[f64]) -> Option<Self> {
        match *bbox {
            [west, south, east, north]
                if bbox.iter().all(|c| c.is_finite()) && west <= east && south <= north =>
            {
                Some(Self {
                    west,
                    south,
                    east,
                    north,
                })
            }
            _ => None,
        }
    }

    /// Square extent of `buffer` degrees around a point, clamped to Earth
    /// ranges.
    pub fn around(point: GeoPoint, buffer: f64) -> Self {
        Self {
            west: (point.longitude() - buffer).max(-180.0),
            south: (point.latitude() - buffer).max(-90.0),
            east: (point.longitude() + buffer).min(180.0),
            north: (point.latitude() + buffer).min(90.0),
        }
    }

    pub fn contains(&self, point: GeoPoint) -> bool {
        point.longitude() >= self.west
            && point.longitude() <= self.east
            && point.latitude() >= self.south
            && point.latitude() <= self.north
    }

    pub fn to_bbox(self) -> [f64; 4] {
        [self.west, self.south, self.east, self.north]
    }
}

/// Which query variant produced a hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QueryOrigin {
    Nts,
    Fsa,
    Coordinate,
    Generic,
}

impl fmt::Display for QueryOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Nts => "NTS",
            Self::Fsa => "FSA",
            Self::Coordinate => "coordinate",
            Self::Generic => "name",
        })
    }
}

/// One search result, normalized across query variants.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// Display label.
    pub name: String,
    pub point: GeoPoint,
    /// Bounding box for zoom-to behavior; contains `point` when present.
    pub extent: Option<Extent>,
    /// Concise type code; `None` for synthetic results such as
    /// grid-reference and coordinate echoes.
    pub type_code: Option<String>,
    /// Human-readable term for `type_code` in the session language.
    pub type_name: Option<String>,
    /// Locality line (county, district) when the service provides one.
    pub location: Option<String>,
    pub province: Option<String>,
    pub province_code: Option<String>,
    pub origin: QueryOrigin,
}

impl SearchHit {
    /// A bare hit with only the required fields set.
    pub fn new(name: impl Into<String>, point: GeoPoint, origin: QueryOrigin) -> Self {
        Self {
            name: name.into(),
            point,
            extent: None,
            type_code: None,
            type_name: None,
            location: None,
            province: None,
            province_code: None,
            origin,
        }
    }

    /// Attach an extent, dropping it unless it contains the hit's point.
    pub fn with_extent(mut self, extent: Option<Extent>) -> Self {
        self.extent = extent.filter(|e| e.contains(self.point));
        self
    }
}
