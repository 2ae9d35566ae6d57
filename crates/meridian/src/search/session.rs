use std::sync::{Arc, Mutex};

use meridian_gazetteer::GazetteerApi;
use tokio::sync::watch;
use tracing::{debug, instrument};

use super::{SearchFilters, SessionSnapshot, SessionState};
use crate::{
    classify::classify,
    config::SearchConfig,
    model::{Extent, QueryOrigin, SearchHit},
    query::ResolveContext,
    registry::{ProvinceRegistry, TypeRegistry},
};

/// The search coordinator.
///
/// `search` is fire-and-forget: it classifies the text, supersedes whatever
/// query was active, and starts resolution on the runtime. Each issued query
/// carries a monotonically increasing sequence number; when its resolution
/// completes, the number is compared against the session's current one under
/// the session lock and stale completions are discarded. Cancellation is
/// logical only: a superseded lookup runs to completion and its outcome is
/// ignored.
///
/// No timeout is imposed here; a stuck lookup leaves the session Pending
/// until a new search or [`clear`](Self::clear) supersedes it.
#[derive(Clone)]
pub struct SearchSession {
    gazetteer: Arc<dyn GazetteerApi>,
    types: Arc<TypeRegistry>,
    provinces: Arc<ProvinceRegistry>,
    config: Arc<SearchConfig>,
    inner: Arc<Mutex<SessionInner>>,
    snapshot_tx: watch::Sender<SessionSnapshot>,
}

#[derive(Debug, Default)]
struct SessionInner {
    seq: u64,
    state: SessionState,
    text: Option<String>,
    origin: Option<QueryOrigin>,
    /// Unfiltered hits of the resolved active query; filters re-apply to
    /// these without re-fetching.
    raw_hits: Vec<SearchHit>,
    filters: SearchFilters,
}

impl SearchSession {
    pub fn new(
        gazetteer: Arc<dyn GazetteerApi>,
        types: Arc<TypeRegistry>,
        provinces: Arc<ProvinceRegistry>,
        config: Arc<SearchConfig>,
    ) -> Self {
        let (snapshot_tx, _) = watch::channel(SessionSnapshot::default());
        Self {
            gazetteer,
            types,
            provinces,
            config,
            inner: Arc::new(Mutex::new(SessionInner::default())),
            snapshot_tx,
        }
    }

    /// Subscribe to session transitions. The receiver always holds the most
    /// recent snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot_tx.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot_tx.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.snapshot_tx.borrow().state
    }

    pub fn results(&self) -> Vec<SearchHit> {
        self.snapshot_tx.borrow().results.clone()
    }

    pub fn filters(&self) -> SearchFilters {
        self.inner.lock().expect("session lock").filters.clone()
    }

    /// Issue a new search, superseding any active query. Empty text clears
    /// the session instead.
    #[instrument(name = "Search", level = "debug", skip(self))]
    pub fn search(&self, raw_text: &str) {
        let text = raw_text.trim().to_string();
        if text.is_empty() {
            self.clear();
            return;
        }

        let query = classify(&text);
        let origin = query.origin();

        let (seq, filters) = {
            let mut inner = self.inner.lock().expect("session lock");
            inner.seq += 1;
            inner.text = Some(text.clone());
            inner.origin = Some(origin);
            inner.raw_hits.clear();

            if let Some(rejection) = query.rejection() {
                debug!(%rejection, "query rejected before lookup");
                inner.state = SessionState::Errored;
                self.publish(&inner, Vec::new(), Some(rejection.to_string()));
                return;
            }

            inner.state = SessionState::Pending;
            self.publish(&inner, Vec::new(), None);
            (inner.seq, inner.filters.clone())
        };

        let session = self.clone();
        tokio::spawn(async move {
            let ctx = ResolveContext {
                gazetteer: &*session.gazetteer,
                types: &session.types,
                provinces: &session.provinces,
                config: &session.config,
                filters: &filters,
            };
            let outcome = query.resolve(&ctx).await;

            let mut inner = session.inner.lock().expect("session lock");
            if inner.seq != seq {
                debug!(seq, current = inner.seq, "discarding superseded completion");
                return;
            }
            match outcome {
                Ok(hits) => {
                    inner.state = SessionState::Resolved;
                    inner.raw_hits = hits;
                    let published = inner.filters.apply(origin, &inner.raw_hits);
                    session.publish(&inner, published, None);
                }
                Err(err) => {
                    inner.state = SessionState::Errored;
                    session.publish(&inner, Vec::new(), Some(err.to_string()));
                }
            }
        });
    }

    /// Drop the active query and return to Idle with empty results. Any
    /// in-flight lookup becomes stale and its completion is discarded.
    pub fn clear(&self) {
        let mut inner = self.inner.lock().expect("session lock");
        inner.seq += 1;
        inner.state = SessionState::Idle;
        inner.text = None;
        inner.origin = None;
        inner.raw_hits.clear();
        self.publish(&inner, Vec::new(), None);
    }

    /// Replace the whole filter set and republish.
    pub fn set_filters(&self, filters: SearchFilters) {
        self.update_filters(|current| *current = filters);
    }

    /// Constrain results to a province code; `None` lifts the constraint.
    pub fn set_province(&self, code: Option<String>) {
        self.update_filters(|filters| filters.province = code);
    }

    /// Replace the set of excluded type codes.
    pub fn set_type_exclusions<I, S>(&self, codes: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let codes: ahash::AHashSet<String> = codes.into_iter().map(Into::into).collect();
        self.update_filters(|filters| filters.exclude_types = codes);
    }

    /// Constrain results to an extent; `None` lifts the constraint.
    pub fn set_extent(&self, extent: Option<Extent>) {
        self.update_filters(|filters| filters.extent = extent);
    }

    /// Filter changes re-apply to the resolved query's raw hits locally;
    /// no lookup is re-issued.
    fn update_filters(&self, mutate: impl FnOnce(&mut SearchFilters)) {
        let mut inner = self.inner.lock().expect("session lock");
        mutate(&mut inner.filters);
        if inner.state == SessionState::Resolved {
            let origin = inner.origin.unwrap_or(QueryOrigin::Generic);
            let published = inner.filters.apply(origin, &inner.raw_hits);
            self.publish(&inner, published, None);
        }
    }

    /// Send a snapshot while holding the session lock, so a sequence check
    /// and its publication are atomic with respect to newer searches.
    fn publish(&self, inner: &SessionInner, results: Vec<SearchHit>, error: Option<String>) {
        self.snapshot_tx.send_replace(SessionSnapshot {
            state: inner.state,
            query: inner.text.clone(),
            results,
            error,
        });
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::atomic::Ordering, time::Duration};

    use super::*;
    use crate::testing::{
        FakeGazetteer, TestWorld, default_province_definitions, default_type_definitions,
        locate_record, name_record,
    };
    use meridian_gazetteer::Language;

    fn session_with(gazetteer: Arc<FakeGazetteer>) -> SearchSession {
        SearchSession::new(
            gazetteer,
            Arc::new(TypeRegistry::from_definitions(
                Language::English,
                default_type_definitions(),
            )),
            Arc::new(ProvinceRegistry::from_definitions(
                Language::English,
                default_province_definitions(),
            )),
            Arc::new(SearchConfig::default()),
        )
    }

    async fn wait_for_state(
        rx: &mut watch::Receiver<SessionSnapshot>,
        state: SessionState,
    ) -> SessionSnapshot {
        rx.wait_for(|snapshot| snapshot.state == state)
            .await
            .expect("session alive")
            .clone()
    }

    #[tokio::test(start_paused = true)]
    async fn resolves_and_publishes() {
        let world = TestWorld::new();
        world.gazetteer.stub_names(
            "Milton",
            vec![name_record("Milton", "CITY", 43.5183, -79.8774, "35")],
        );
        let session = session_with(Arc::clone(&world.gazetteer));
        let mut rx = session.subscribe();

        session.search("Milton");
        let snapshot = wait_for_state(&mut rx, SessionState::Resolved).await;

        assert_eq!(snapshot.results.len(), 1);
        assert_eq!(snapshot.results[0].name, "Milton");
        assert_eq!(snapshot.query.as_deref(), Some("Milton"));
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_completion_is_discarded() {
        let world = TestWorld::new();
        world
            .gazetteer
            .stub_names("Alpha", vec![name_record("Alpha", "CITY", 45.0, -75.0, "35")]);
        world
            .gazetteer
            .stub_names("Beta", vec![name_record("Beta", "TOWN", 46.0, -74.0, "24")]);
        // Alpha resolves long after Beta
        world.gazetteer.delay("Alpha", Duration::from_millis(500));
        world.gazetteer.delay("Beta", Duration::from_millis(10));

        let session = session_with(Arc::clone(&world.gazetteer));
        let mut rx = session.subscribe();

        session.search("Alpha");
        session.search("Beta");

        let snapshot = wait_for_state(&mut rx, SessionState::Resolved).await;
        assert_eq!(snapshot.results[0].name, "Beta");

        // let Alpha's lookup complete; it must not overwrite Beta's outcome
        tokio::time::sleep(Duration::from_millis(600)).await;
        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, SessionState::Resolved);
        assert_eq!(snapshot.results.len(), 1);
        assert_eq!(snapshot.results[0].name, "Beta");
        assert_eq!(world.gazetteer.name_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_text_clears_to_idle_from_any_state() {
        let world = TestWorld::new();
        world
            .gazetteer
            .stub_names("Milton", vec![name_record("Milton", "CITY", 43.5, -79.9, "35")]);
        let session = session_with(Arc::clone(&world.gazetteer));
        let mut rx = session.subscribe();

        session.search("Milton");
        wait_for_state(&mut rx, SessionState::Resolved).await;

        session.search("");
        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, SessionState::Idle);
        assert!(snapshot.results.is_empty());
        assert!(snapshot.query.is_none());

        // clearing while Pending also discards the in-flight lookup
        world.gazetteer.delay("Milton", Duration::from_millis(100));
        session.search("Milton");
        session.clear();
        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.results().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rejected_query_errors_without_lookup() {
        let world = TestWorld::new();
        let session = session_with(Arc::clone(&world.gazetteer));

        session.search("064D");
        let snapshot = session.snapshot();
        assert_eq!(snapshot.state, SessionState::Errored);
        assert!(snapshot.error.as_deref().unwrap_or("").contains("064D"));
        assert_eq!(world.gazetteer.locate_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_failure_reaches_errored() {
        let world = TestWorld::new();
        world.gazetteer.fail_names("Milton");
        let session = session_with(Arc::clone(&world.gazetteer));
        let mut rx = session.subscribe();

        session.search("Milton");
        let snapshot = wait_for_state(&mut rx, SessionState::Errored).await;
        assert!(snapshot.results.is_empty());
        assert!(snapshot.error.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn refiltering_is_local_and_reversible() {
        let world = TestWorld::new();
        world.gazetteer.stub_names(
            "Milton",
            vec![
                name_record("Milton", "CITY", 43.5183, -79.8774, "35"),
                name_record("Milton-Ouest", "UNP", 45.6, -72.9, "24"),
            ],
        );
        let session = session_with(Arc::clone(&world.gazetteer));
        let mut rx = session.subscribe();

        session.search("Milton");
        wait_for_state(&mut rx, SessionState::Resolved).await;
        assert_eq!(session.results().len(), 2);

        session.set_province(Some("24".to_string()));
        let names: Vec<String> = session.results().iter().map(|h| h.name.clone()).collect();
        assert_eq!(names, ["Milton-Ouest"]);

        session.set_type_exclusions(["UNP"]);
        assert!(session.results().is_empty());

        session.set_province(None);
        session.set_type_exclusions(Vec::<String>::new());
        assert_eq!(session.results().len(), 2);

        // every re-filter above reused the fetched hits
        assert_eq!(world.gazetteer.name_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn filters_do_not_constrain_nts_results() {
        let world = TestWorld::new();
        world.gazetteer.stub_locate(
            "064D06",
            vec![locate_record("064D06 NUMABIN BAY", -100.75, 56.375, None)],
        );
        let session = session_with(Arc::clone(&world.gazetteer));
        let mut rx = session.subscribe();

        session.set_province(Some("35".to_string()));
        session.search("064D06");
        let snapshot = wait_for_state(&mut rx, SessionState::Resolved).await;
        assert_eq!(snapshot.results.len(), 1);
    }
}
