//! Search session coordination.
//!
//! [`SearchSession`] owns the per-session state machine: it classifies
//! incoming text, launches resolution, guarantees that only the most recent
//! query can affect published state, and applies the active filters to
//! resolved results. Consumers observe the session through a watch channel
//! of [`SessionSnapshot`] values rather than return values, reflecting the
//! asynchronous, possibly superseded nature of lookups.

mod session;

pub use session::SearchSession;

use ahash::AHashSet;
use serde::Serialize;

use crate::model::{Extent, QueryOrigin, SearchHit};

/// Where a session currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SessionState {
    /// No active query.
    #[default]
    Idle,
    /// A query is classified and its lookup is in flight.
    Pending,
    /// The active query completed; published results are current.
    Resolved,
    /// The active query was rejected or its lookup failed.
    Errored,
}

/// What a session publishes after every transition.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    /// Raw text of the active query, if any.
    pub query: Option<String>,
    /// Results after filter application, in ranked order.
    pub results: Vec<SearchHit>,
    /// Human-readable failure description when `state` is `Errored`.
    pub error: Option<String>,
}

/// Filters a session applies to its published results.
///
/// Applying filters is a pure, local transform over already-fetched hits;
/// it never re-triggers a lookup. Only generic-origin results are
/// constrained: grid-reference, postal and coordinate results come from a
/// single authoritative source that province/type narrowing does not apply
/// to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchFilters {
    /// Numeric province code results must lie in.
    pub province: Option<String>,
    /// Concise type codes to drop.
    pub exclude_types: AHashSet<String>,
    /// Bounding box results must fall inside.
    pub extent: Option<Extent>,
}

impl SearchFilters {
    pub fn apply(&self, origin: QueryOrigin, hits: &[SearchHit]) -> Vec<SearchHit> {
        if origin != QueryOrigin::Generic {
            return hits.to_vec();
        }
        hits.iter()
            .filter(|hit| self.matches(hit))
            .cloned()
            .collect()
    }

    fn matches(&self, hit: &SearchHit) -> bool {
        if let Some(code) = &self.province {
            if hit.province_code.as_deref() != Some(code.as_str()) {
                return false;
            }
        }
        if let Some(type_code) = &hit.type_code {
            if self.exclude_types.contains(type_code) {
                return false;
            }
        }
        if let Some(extent) = &self.extent {
            if !extent.contains(hit.point) {
                return false;
            }
        }
        true
    }
}
