//! Generic place-name queries.

use itertools::Itertools;
use meridian_gazetteer::{NameRecord, NameSearchParams};

use super::{QueryRejection, ResolveContext, ResolveError, checked_point};
use crate::model::{Extent, QueryOrigin, SearchHit};

/// Anything shorter performs no lookup at all.
pub(crate) const MIN_QUERY_LEN: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameQuery {
    text: String,
}

impl NameQuery {
    /// Normalize by trimming and collapsing internal whitespace.
    pub(crate) fn from_raw(raw: &str) -> Self {
        Self {
            text: raw.split_whitespace().join(" "),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub(crate) fn rejection(&self) -> Option<QueryRejection> {
        (self.text.chars().count() < MIN_QUERY_LEN).then(|| QueryRejection::TooShort {
            text: self.text.clone(),
            min: MIN_QUERY_LEN,
        })
    }

    /// Fuzzy lookup against the place-name service. Province and extent
    /// filters ride along as service parameters; type exclusion is applied
    /// here as a post-filter through the registry's valid-type view.
    pub(crate) async fn resolve(
        &self,
        ctx: &ResolveContext<'_>,
    ) -> Result<Vec<SearchHit>, ResolveError> {
        let mut params = NameSearchParams::by_text(&self.text, ctx.config.max_results);
        params.bbox = ctx.filters.extent.map(Extent::to_bbox);
        params.province = ctx.filters.province.clone();
        params.categories = ctx.config.categories.clone();
        params.official_only = ctx.config.official_only;

        let records = ctx.gazetteer.find_names(&params).await?;
        let mut hits = map_name_records(records, ctx, QueryOrigin::Generic)?;
        sort_by_type_order(&mut hits, &ctx.config.sort_order);
        Ok(hits)
    }
}

/// Map place-name records to hits, dropping records whose type code has
/// been excluded from the registry's valid view.
pub(super) fn map_name_records(
    records: Vec<NameRecord>,
    ctx: &ResolveContext<'_>,
    origin: QueryOrigin,
) -> Result<Vec<SearchHit>, ResolveError> {
    records
        .into_iter()
        .filter(|record| ctx.types.is_valid(&record.concise.code))
        .map(|record| {
            let point = checked_point(Some(record.latitude), Some(record.longitude))?;
            let code = record.concise.code.to_uppercase();

            let mut hit = SearchHit::new(record.name, point, origin)
                .with_extent(record.bbox.as_deref().and_then(Extent::from_bbox));
            hit.type_name = ctx.types.describe(&code);
            hit.type_code = Some(code);
            hit.location = record.location;
            hit.province = ctx
                .provinces
                .name_for_code(&record.province.code)
                .map(str::to_string);
            hit.province_code = Some(record.province.code);
            Ok(hit)
        })
        .collect()
}

/// Stable-sort hits by the configured type-code ranking; codes not in the
/// ranking sort after all ranked ones.
pub(super) fn sort_by_type_order(hits: &mut [SearchHit], order: &[String]) {
    if order.is_empty() {
        return;
    }
    hits.sort_by_key(|hit| {
        hit.type_code
            .as_deref()
            .and_then(|code| order.iter().position(|ranked| ranked == code))
            .unwrap_or(order.len())
    });
}
