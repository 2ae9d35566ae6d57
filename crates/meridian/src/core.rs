//! The main [`GeoSearcher`] facade.
//!
//! A searcher composes the pieces a query needs to resolve: the gazetteer
//! client, the per-language registry caches and the session configuration.
//! It offers one-shot classification/resolution for callers that want a
//! plain async result, and [`GeoSearcher::session`] for interactive callers
//! that want supersession and filter handling.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use meridian::{GeoSearcher, SearchConfig};
//!
//! # async fn demo() -> meridian::Result<()> {
//! let searcher = GeoSearcher::new(SearchConfig::default());
//! searcher.init().await?;
//!
//! let hits = searcher.search_once("Milton").await?;
//! for hit in &hits {
//!     println!("{} @ {}", hit.name, hit.point);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use meridian_gazetteer::{GazetteerApi, GeogratisClient};
use tracing::{info, instrument};

use crate::{
    classify::classify,
    config::SearchConfig,
    error::Result,
    model::SearchHit,
    query::{ClassifiedQuery, ResolveContext},
    registry::{ProvinceRegistry, ProvinceStore, TypeRegistry, TypeStore},
    search::{SearchFilters, SearchSession},
};

/// Classifies and resolves geographic queries against the configured
/// gazetteer services.
///
/// The searcher owns the registry caches explicitly; cloning it is cheap
/// and clones share the caches and the underlying client.
#[derive(Clone)]
pub struct GeoSearcher {
    config: Arc<SearchConfig>,
    gazetteer: Arc<dyn GazetteerApi>,
    types: Arc<TypeStore>,
    provinces: Arc<ProvinceStore>,
}

impl GeoSearcher {
    /// Create a searcher backed by the HTTP gazetteer client.
    pub fn new(config: SearchConfig) -> Self {
        let client = GeogratisClient::with_endpoints(config.endpoints.clone(), config.language);
        Self::with_gazetteer(config, Arc::new(client))
    }

    /// Create a searcher over a custom [`GazetteerApi`] implementation.
    pub fn with_gazetteer(config: SearchConfig, gazetteer: Arc<dyn GazetteerApi>) -> Self {
        Self {
            config: Arc::new(config),
            types: Arc::new(TypeStore::new(Arc::clone(&gazetteer))),
            provinces: Arc::new(ProvinceStore::new(Arc::clone(&gazetteer))),
            gazetteer,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Warm the registry caches for the configured language and apply the
    /// configured type exclusions. Lookups load the registries lazily, so
    /// calling this is optional but front-loads the definition fetches.
    #[instrument(name = "Initialize GeoSearcher", level = "info", skip(self))]
    pub async fn init(&self) -> Result<()> {
        let (types, provinces) = self.registries().await?;
        info!(
            language = %self.config.language,
            types = types.all_types().len(),
            provinces = provinces.list().len(),
            "registries loaded"
        );
        Ok(())
    }

    /// Classify raw text without resolving it.
    pub fn classify(&self, raw_text: &str) -> ClassifiedQuery {
        classify(raw_text)
    }

    /// Resolve a classified query once, with no session filters applied.
    pub async fn resolve(&self, query: &ClassifiedQuery) -> Result<Vec<SearchHit>> {
        let (types, provinces) = self.registries().await?;
        let filters = SearchFilters::default();
        let ctx = ResolveContext {
            gazetteer: &*self.gazetteer,
            types: &types,
            provinces: &provinces,
            config: &self.config,
            filters: &filters,
        };
        Ok(query.resolve(&ctx).await?)
    }

    /// Classify and resolve in one call.
    ///
    /// Rejected queries (partial NTS, bare FSA, too-short text) surface as
    /// [`MeridianError::Rejected`](crate::MeridianError::Rejected) without a
    /// lookup; an unknown but well-formed query yields an empty list.
    pub async fn search_once(&self, raw_text: &str) -> Result<Vec<SearchHit>> {
        let query = classify(raw_text);
        self.resolve(&query).await
    }

    /// Start an interactive search session sharing this searcher's client,
    /// caches and configuration.
    pub async fn session(&self) -> Result<SearchSession> {
        let (types, provinces) = self.registries().await?;
        Ok(SearchSession::new(
            Arc::clone(&self.gazetteer),
            types,
            provinces,
            Arc::clone(&self.config),
        ))
    }

    /// The type registry for the configured language, for driving filter
    /// UIs.
    pub async fn types(&self) -> Result<Arc<TypeRegistry>> {
        Ok(self.registries().await?.0)
    }

    /// The province registry for the configured language.
    pub async fn provinces(&self) -> Result<Arc<ProvinceRegistry>> {
        Ok(self.registries().await?.1)
    }

    /// Load (or fetch from cache) both registries and apply the configured
    /// exclusions. Exclusion is idempotent, so repeated calls settle on the
    /// same valid-type view.
    async fn registries(&self) -> Result<(Arc<TypeRegistry>, Arc<ProvinceRegistry>)> {
        let language = self.config.language;
        let (types, provinces) = tokio::try_join!(
            self.types.for_language(language),
            self.provinces.for_language(language),
        )?;
        types.filter_valid_types(&self.config.exclude_types);
        Ok((types, provinces))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;

    use super::*;
    use crate::{
        model::QueryOrigin,
        testing::{FakeGazetteer, name_record},
    };

    fn fake_searcher() -> (GeoSearcher, Arc<FakeGazetteer>) {
        let gazetteer = Arc::new(FakeGazetteer::new());
        let config = SearchConfig::builder().exclude_types(["UNP"]).build();
        let searcher =
            GeoSearcher::with_gazetteer(config, gazetteer.clone() as Arc<dyn GazetteerApi>);
        (searcher, gazetteer)
    }

    #[tokio::test]
    async fn registries_load_once_per_language() {
        let (searcher, gazetteer) = fake_searcher();

        searcher.init().await.unwrap();
        let first = gazetteer.definition_calls.load(Ordering::SeqCst);
        assert_eq!(first, 2);

        // cached on the second pass
        searcher.init().await.unwrap();
        assert_eq!(gazetteer.definition_calls.load(Ordering::SeqCst), first);
    }

    #[tokio::test]
    async fn configured_exclusions_apply_to_lookups() {
        let (searcher, gazetteer) = fake_searcher();
        gazetteer.stub_names(
            "Milton",
            vec![
                name_record("Milton", "CITY", 43.5183, -79.8774, "35"),
                name_record("Milton Heights", "UNP", 43.52, -79.93, "35"),
            ],
        );

        let hits = searcher.search_once("Milton").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].name, "Milton");
        assert_eq!(hits[0].origin, QueryOrigin::Generic);
    }

    #[tokio::test]
    async fn search_once_surfaces_rejections() {
        let (searcher, _) = fake_searcher();
        let outcome = searcher.search_once("064D").await;
        assert!(matches!(
            outcome,
            Err(crate::MeridianError::Rejected(_))
        ));
    }
}
