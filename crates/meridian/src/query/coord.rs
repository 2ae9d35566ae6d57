//! Coordinate-pair queries.
//!
//! The classifier accepts decimal-degree pairs and degree-minute-second
//! triplets; both normalize to a validated [`GeoPoint`]. Resolution echoes
//! the parsed point back as the first hit (with a small zoom-to extent
//! around it) and follows with named places near the point.

use meridian_gazetteer::NameSearchParams;

use super::{ResolveContext, ResolveError, name::map_name_records};
use crate::model::{Extent, GeoPoint, QueryOrigin, SearchHit};

/// Zoom-to box half-width around the echoed point, in degrees.
const ECHO_BUFFER_DEGREES: f64 = 0.015;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateNotation {
    DecimalDegrees,
    DegreesMinutesSeconds,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CoordinateQuery {
    point: GeoPoint,
    notation: CoordinateNotation,
    normalized: String,
}

impl CoordinateQuery {
    pub(crate) fn new(point: GeoPoint, notation: CoordinateNotation) -> Self {
        Self {
            point,
            notation,
            normalized: point.to_string(),
        }
    }

    pub fn point(&self) -> GeoPoint {
        self.point
    }

    pub fn notation(&self) -> CoordinateNotation {
        self.notation
    }

    /// Canonical `lat,lon` decimal-degree form.
    pub fn normalized(&self) -> &str {
        &self.normalized
    }

    /// Echo the point, then list named places around it. The service
    /// rejects a bbox combined with lat/lon, so an active extent filter is
    /// applied to the nearby names after the fact.
    pub(crate) async fn resolve(
        &self,
        ctx: &ResolveContext<'_>,
    ) -> Result<Vec<SearchHit>, ResolveError> {
        let echo = SearchHit::new(self.normalized.clone(), self.point, QueryOrigin::Coordinate)
            .with_extent(Some(Extent::around(self.point, ECHO_BUFFER_DEGREES)));

        let mut params = NameSearchParams::by_position(
            self.point.latitude(),
            self.point.longitude(),
            ctx.config.max_results,
        );
        params.categories = ctx.config.categories.clone();
        params.official_only = ctx.config.official_only;

        let records = ctx.gazetteer.find_names(&params).await?;
        let mut nearby = map_name_records(records, ctx, QueryOrigin::Coordinate)?;
        if let Some(extent) = ctx.filters.extent {
            nearby.retain(|hit| extent.contains(hit.point));
        }

        let mut hits = vec![echo];
        hits.extend(nearby);
        Ok(hits)
    }
}
