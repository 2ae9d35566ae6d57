//! Postal codes and forward sortation areas.
//!
//! A full six-character postal code resolves through the locate gazetteer;
//! a bare FSA (the first three characters) is too coarse for the service
//! and is flagged incomplete. The FSA's first letter determines the
//! province (or, for `X`, the pair of territories), which annotates the
//! mapped hits.

use itertools::Itertools;
use meridian_gazetteer::LocateRecord;

use super::{QueryRejection, ResolveContext, ResolveError, checked_point};
use crate::model::{Extent, QueryOrigin, SearchHit};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsaQuery {
    code: String,
    fsa: String,
    complete: bool,
}

impl FsaQuery {
    pub(crate) fn from_parts(fsa: &str, unit: Option<&str>) -> Self {
        let mut code = fsa.to_string();
        if let Some(unit) = unit {
            code.push_str(unit);
        }
        Self {
            code,
            fsa: fsa.to_string(),
            complete: unit.is_some(),
        }
    }

    /// Normalized code: uppercased, internal whitespace removed. The full
    /// six characters for a postal code, three for a bare FSA.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// The forward sortation area, always the first three characters.
    pub fn fsa(&self) -> &str {
        &self.fsa
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub(crate) fn rejection(&self) -> Option<QueryRejection> {
        (!self.complete).then(|| QueryRejection::IncompleteFsa {
            fsa: self.fsa.clone(),
        })
    }

    /// Look the postal code up in the locate gazetteer. Codes straddling
    /// boundaries can come back as several candidate locations; each maps
    /// to its own hit.
    pub(crate) async fn resolve(
        &self,
        ctx: &ResolveContext<'_>,
    ) -> Result<Vec<SearchHit>, ResolveError> {
        let records = ctx.gazetteer.locate(&self.code).await?;
        records
            .iter()
            .map(|record| self.map_candidate(record, ctx))
            .collect()
    }

    fn map_candidate(
        &self,
        record: &LocateRecord,
        ctx: &ResolveContext<'_>,
    ) -> Result<SearchHit, ResolveError> {
        let point = checked_point(record.latitude(), record.longitude())?;

        let provinces = ctx.provinces.fsa_to_provinces(&self.fsa);
        let province = provinces.iter().map(|p| p.name.as_str()).join(",");

        let mut hit = SearchHit::new(record.title.clone(), point, QueryOrigin::Fsa)
            .with_extent(record.bbox.as_deref().and_then(Extent::from_bbox));
        hit.type_name = ctx.types.describe("FSA");
        hit.province = (!province.is_empty()).then_some(province);
        // only unambiguous when the first letter maps to a single province
        hit.province_code = match provinces.as_slice() {
            [province] => Some(province.code.clone()),
            _ => None,
        };
        Ok(hit)
    }
}
