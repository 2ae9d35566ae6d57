//! Structured query variants and their resolution protocols.
//!
//! A [`ClassifiedQuery`] is what the classifier hands back: the raw text
//! plus a [`QueryKind`] tagging which variant applies. Each variant owns its
//! normalization and its remote resolution; [`ClassifiedQuery::resolve`]
//! dispatches and enforces the shared contract: rejected queries never reach
//! the wire, "no match" resolves to an empty hit list, and transport or
//! payload failures surface as [`ResolveError::Lookup`].

mod coord;
mod fsa;
mod name;
mod nts;

pub use coord::{CoordinateNotation, CoordinateQuery};
pub use fsa::FsaQuery;
pub use name::NameQuery;
pub use nts::NtsQuery;

use meridian_gazetteer::{GazetteerApi, GazetteerError};
use thiserror::Error;
use tracing::instrument;

use crate::{
    config::SearchConfig,
    model::{GeoPoint, QueryOrigin, SearchHit},
    registry::{ProvinceRegistry, TypeRegistry},
    search::SearchFilters,
};

/// A query refused before any lookup: the text failed variant validation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryRejection {
    #[error("'{text}' is too short for a place-name search (minimum {min} characters)")]
    TooShort { text: String, min: usize },
    #[error("NTS reference '{code}' is missing its map-sheet unit")]
    IncompleteNts { code: String },
    #[error("'{fsa}' is a bare forward sortation area; a full postal code is required")]
    IncompleteFsa { fsa: String },
}

/// Why a resolution failed. Rejections are synchronous and never issue a
/// network call; lookup failures come from the gazetteer boundary.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error(transparent)]
    Rejected(#[from] QueryRejection),
    #[error(transparent)]
    Lookup(#[from] GazetteerError),
}

/// Everything a variant needs to resolve: the gazetteer boundary, the two
/// registries, session configuration and the filters active at issue time.
pub struct ResolveContext<'a> {
    pub gazetteer: &'a dyn GazetteerApi,
    pub types: &'a TypeRegistry,
    pub provinces: &'a ProvinceRegistry,
    pub config: &'a SearchConfig,
    pub filters: &'a SearchFilters,
}

/// The concrete variant a piece of text classified into.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryKind {
    Nts(NtsQuery),
    Fsa(FsaQuery),
    Coordinate(CoordinateQuery),
    Generic(NameQuery),
}

/// Raw input paired with its classified variant.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedQuery {
    raw: String,
    kind: QueryKind,
}

impl ClassifiedQuery {
    pub(crate) fn new(raw_text: &str, kind: QueryKind) -> Self {
        Self {
            raw: raw_text.to_string(),
            kind,
        }
    }

    /// The user's input, exactly as typed.
    pub fn raw_text(&self) -> &str {
        &self.raw
    }

    pub fn kind(&self) -> &QueryKind {
        &self.kind
    }

    pub fn origin(&self) -> QueryOrigin {
        match &self.kind {
            QueryKind::Nts(_) => QueryOrigin::Nts,
            QueryKind::Fsa(_) => QueryOrigin::Fsa,
            QueryKind::Coordinate(_) => QueryOrigin::Coordinate,
            QueryKind::Generic(_) => QueryOrigin::Generic,
        }
    }

    /// The variant's canonical form of the input.
    pub fn normalized(&self) -> &str {
        match &self.kind {
            QueryKind::Nts(nts) => nts.code(),
            QueryKind::Fsa(fsa) => fsa.code(),
            QueryKind::Coordinate(coord) => coord.normalized(),
            QueryKind::Generic(name) => name.text(),
        }
    }

    /// Why this query must not be resolved, if anything. `None` means the
    /// query may proceed to a lookup.
    pub fn rejection(&self) -> Option<QueryRejection> {
        match &self.kind {
            QueryKind::Nts(nts) => nts.rejection(),
            QueryKind::Fsa(fsa) => fsa.rejection(),
            QueryKind::Coordinate(_) => None,
            QueryKind::Generic(name) => name.rejection(),
        }
    }

    pub fn is_resolvable(&self) -> bool {
        self.rejection().is_none()
    }

    /// Resolve against the remote services. Completes exactly once per call;
    /// an empty hit list is a normal outcome, distinct from failure.
    #[instrument(name = "Resolve Query", level = "debug", skip(self, ctx), fields(query = %self.normalized()))]
    pub async fn resolve(&self, ctx: &ResolveContext<'_>) -> Result<Vec<SearchHit>, ResolveError> {
        if let Some(rejection) = self.rejection() {
            return Err(rejection.into());
        }

        match &self.kind {
            QueryKind::Nts(nts) => nts.resolve(ctx).await,
            QueryKind::Fsa(fsa) => fsa.resolve(ctx).await,
            QueryKind::Coordinate(coord) => coord.resolve(ctx).await,
            QueryKind::Generic(name) => name.resolve(ctx).await,
        }
    }
}

/// Build a validated point from service-supplied coordinates, mapping
/// missing or out-of-range values to a malformed-payload failure.
pub(crate) fn checked_point(
    latitude: Option<f64>,
    longitude: Option<f64>,
) -> Result<GeoPoint, GazetteerError> {
    let (Some(latitude), Some(longitude)) = (latitude, longitude) else {
        return Err(GazetteerError::Payload(
            "feature record is missing coordinates".to_string(),
        ));
    };
    GeoPoint::new(latitude, longitude).map_err(|err| GazetteerError::Payload(err.to_string()))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::{classify::classify, testing::TestWorld};

    #[tokio::test]
    async fn incomplete_nts_rejects_without_lookup() {
        let world = TestWorld::new();
        let query = classify("064D");

        let outcome = query.resolve(&world.ctx()).await;
        assert!(matches!(
            outcome,
            Err(ResolveError::Rejected(QueryRejection::IncompleteNts { .. }))
        ));
        assert_eq!(world.gazetteer.locate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn bare_fsa_rejects_without_lookup() {
        let world = TestWorld::new();
        let query = classify("L5L");

        let outcome = query.resolve(&world.ctx()).await;
        assert!(matches!(
            outcome,
            Err(ResolveError::Rejected(QueryRejection::IncompleteFsa { .. }))
        ));
        assert_eq!(world.gazetteer.locate_calls.load(Ordering::SeqCst), 0);
        assert_eq!(world.gazetteer.name_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn too_short_name_rejects_without_lookup() {
        let world = TestWorld::new();
        let query = classify("M");

        let outcome = query.resolve(&world.ctx()).await;
        assert!(matches!(
            outcome,
            Err(ResolveError::Rejected(QueryRejection::TooShort { .. }))
        ));
        assert_eq!(world.gazetteer.name_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn lookup_failure_surfaces_as_lookup_error() {
        let world = TestWorld::new();
        world.gazetteer.fail_locate("064D02");
        let query = classify("064D02");

        let outcome = query.resolve(&world.ctx()).await;
        assert!(matches!(outcome, Err(ResolveError::Lookup(_))));
    }

    #[tokio::test]
    async fn not_found_resolves_to_empty_set() {
        let world = TestWorld::new();
        let query = classify("064D02");

        let hits = query.resolve(&world.ctx()).await.unwrap();
        assert!(hits.is_empty());
        assert_eq!(world.gazetteer.locate_calls.load(Ordering::SeqCst), 1);
    }
}
