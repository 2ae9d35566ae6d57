//! National Topographic System grid references.
//!
//! A reference names a sheet (two or three digits, zero-padded to three), a
//! map-unit subdivision (A-P) and optionally a map-sheet unit (01-16):
//! `064D` names a subdivision, `064D06` a map sheet within it. The locate
//! gazetteer requires the full three-part form, so a reference without its
//! unit is flagged incomplete and never looked up. Finer subdivisions
//! (blocks and units) exist in the NTS scheme but are not served by the
//! gazetteer and are not modeled here.

use itertools::Itertools;
use meridian_gazetteer::LocateRecord;
use tracing::debug;

use super::{QueryRejection, ResolveContext, ResolveError, checked_point};
use crate::model::{Extent, QueryOrigin, SearchHit};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NtsQuery {
    code: String,
    complete: bool,
}

impl NtsQuery {
    pub(crate) fn from_parts(sheet: &str, subdivision: &str, unit: Option<&str>) -> Self {
        let mut code = format!("{sheet:0>3}{subdivision}");
        if let Some(unit) = unit {
            code.push_str(unit);
        }
        Self {
            code,
            complete: unit.is_some(),
        }
    }

    /// Normalized reference, e.g. `064D` or `064D06`.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn sheet(&self) -> &str {
        &self.code[..3]
    }

    pub fn subdivision(&self) -> &str {
        &self.code[3..4]
    }

    pub fn unit(&self) -> Option<&str> {
        self.code.get(4..6)
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub(crate) fn rejection(&self) -> Option<QueryRejection> {
        (!self.complete).then(|| QueryRejection::IncompleteNts {
            code: self.code.clone(),
        })
    }

    /// Look the full reference up in the locate gazetteer. The code is an
    /// exact key, so at most the first returned feature is authoritative;
    /// an unknown reference resolves to an empty hit list.
    pub(crate) async fn resolve(
        &self,
        ctx: &ResolveContext<'_>,
    ) -> Result<Vec<SearchHit>, ResolveError> {
        let records = ctx.gazetteer.locate(&self.code).await?;

        let Some(record) = records.first() else {
            debug!(code = %self.code, "grid reference not found");
            return Ok(Vec::new());
        };

        Ok(vec![map_sheet(record, ctx)?])
    }
}

/// Map a locate feature to the single authoritative hit for a sheet. Titles
/// have the form `"064D06 NUMABIN BAY"`: the reference echoed back, then the
/// sheet's place name.
fn map_sheet(record: &LocateRecord, ctx: &ResolveContext<'_>) -> Result<SearchHit, ResolveError> {
    let point = checked_point(record.latitude(), record.longitude())?;

    let mut parts = record.title.split_whitespace();
    let code = parts.next().unwrap_or(record.title.as_str()).to_string();
    let place = parts.join(" ");

    let mut hit = SearchHit::new(code, point, QueryOrigin::Nts)
        .with_extent(record.bbox.as_deref().and_then(Extent::from_bbox));
    hit.type_name = ctx.types.describe("NTS");
    hit.location = (!place.is_empty()).then_some(place);
    Ok(hit)
}
