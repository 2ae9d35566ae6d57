//! In-crate test support: a scriptable gazetteer fake and fixture data.
//! Compiled only for unit tests; the integration suite carries its own copy.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use ahash::{AHashMap, AHashSet};
use async_trait::async_trait;
use meridian_gazetteer::{
    CodeRef, Definition, GazetteerApi, GazetteerError, Language, LocateRecord, NameRecord,
    NameSearchParams, PointGeometry,
};

use crate::{
    config::SearchConfig,
    query::ResolveContext,
    registry::{ProvinceRegistry, TypeRegistry},
    search::SearchFilters,
};

pub(crate) fn locate_record(
    title: &str,
    longitude: f64,
    latitude: f64,
    bbox: Option<[f64; 4]>,
) -> LocateRecord {
    LocateRecord {
        title: title.to_string(),
        bbox: bbox.map(|b| b.to_vec()),
        geometry: PointGeometry {
            coordinates: vec![longitude, latitude],
        },
    }
}

pub(crate) fn name_record(
    name: &str,
    concise: &str,
    latitude: f64,
    longitude: f64,
    province_code: &str,
) -> NameRecord {
    NameRecord {
        name: name.to_string(),
        location: None,
        province: CodeRef {
            code: province_code.to_string(),
        },
        concise: CodeRef {
            code: concise.to_string(),
        },
        latitude,
        longitude,
        bbox: None,
    }
}

/// Key under which a positional name search is stubbed.
pub(crate) fn position_key(latitude: f64, longitude: f64) -> String {
    format!("{latitude},{longitude}")
}

fn definition(code: &str, term: &str, description: Option<&str>) -> Definition {
    Definition {
        code: code.to_string(),
        term: term.to_string(),
        description: description.map(str::to_string),
    }
}

pub(crate) fn default_type_definitions() -> Vec<Definition> {
    vec![
        definition("CITY", "City", None),
        definition("TOWN", "Town", None),
        definition("LAKE", "Lake", None),
        definition("UNP", "UNP", Some("Unincorporated area")),
        definition("TERR", "Territory", None),
        definition("NTS", "NTS", Some("National Topographic System")),
        definition("FSA", "FSA", Some("Forward Sortation Area")),
    ]
}

pub(crate) fn default_province_definitions() -> Vec<Definition> {
    vec![
        definition("24", "QC", Some("Quebec")),
        definition("35", "ON", Some("Ontario")),
        definition("46", "MB", Some("Manitoba")),
        definition("61", "NT", Some("Northwest Territories")),
        definition("62", "NU", Some("Nunavut")),
    ]
}

/// Scriptable [`GazetteerApi`] implementation. Responses are stubbed per
/// lookup key; unknown keys answer with an empty record list, mirroring the
/// real services' "no match" behavior. Keys can be made to fail or to take
/// (tokio) time, and every call is counted so tests can assert that a path
/// issued no lookup.
#[derive(Default)]
pub(crate) struct FakeGazetteer {
    locate_stubs: Mutex<AHashMap<String, Vec<LocateRecord>>>,
    name_stubs: Mutex<AHashMap<String, Vec<NameRecord>>>,
    failing: Mutex<AHashSet<String>>,
    delays: Mutex<AHashMap<String, Duration>>,
    last_params: Mutex<Option<NameSearchParams>>,
    pub locate_calls: AtomicUsize,
    pub name_calls: AtomicUsize,
    pub definition_calls: AtomicUsize,
}

impl FakeGazetteer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stub_locate(&self, code: &str, records: Vec<LocateRecord>) {
        self.locate_stubs
            .lock()
            .unwrap()
            .insert(code.to_string(), records);
    }

    pub fn stub_names(&self, key: &str, records: Vec<NameRecord>) {
        self.name_stubs
            .lock()
            .unwrap()
            .insert(key.to_string(), records);
    }

    pub fn fail_locate(&self, code: &str) {
        self.failing.lock().unwrap().insert(code.to_string());
    }

    pub fn fail_names(&self, key: &str) {
        self.failing.lock().unwrap().insert(key.to_string());
    }

    /// Delay completion of lookups for `key` by `duration` of tokio time.
    pub fn delay(&self, key: &str, duration: Duration) {
        self.delays
            .lock()
            .unwrap()
            .insert(key.to_string(), duration);
    }

    pub fn last_name_params(&self) -> Option<NameSearchParams> {
        self.last_params.lock().unwrap().clone()
    }

    async fn simulate(&self, key: &str) -> Result<(), GazetteerError> {
        let delay = self.delays.lock().unwrap().get(key).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing.lock().unwrap().contains(key) {
            return Err(GazetteerError::Payload(format!(
                "stubbed failure for '{key}'"
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl GazetteerApi for FakeGazetteer {
    async fn locate(&self, code: &str) -> Result<Vec<LocateRecord>, GazetteerError> {
        self.locate_calls.fetch_add(1, Ordering::SeqCst);
        self.simulate(code).await?;
        Ok(self
            .locate_stubs
            .lock()
            .unwrap()
            .get(code)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_names(
        &self,
        params: &NameSearchParams,
    ) -> Result<Vec<NameRecord>, GazetteerError> {
        self.name_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().unwrap() = Some(params.clone());

        let key = params.position.map_or_else(
            || params.text.clone().unwrap_or_default(),
            |(lat, lon)| position_key(lat, lon),
        );
        self.simulate(&key).await?;
        Ok(self
            .name_stubs
            .lock()
            .unwrap()
            .get(&key)
            .cloned()
            .unwrap_or_default())
    }

    async fn type_definitions(
        &self,
        _language: Language,
    ) -> Result<Vec<Definition>, GazetteerError> {
        self.definition_calls.fetch_add(1, Ordering::SeqCst);
        Ok(default_type_definitions())
    }

    async fn province_definitions(
        &self,
        _language: Language,
    ) -> Result<Vec<Definition>, GazetteerError> {
        self.definition_calls.fetch_add(1, Ordering::SeqCst);
        Ok(default_province_definitions())
    }
}

/// A ready-to-use resolution environment around a [`FakeGazetteer`].
pub(crate) struct TestWorld {
    pub gazetteer: Arc<FakeGazetteer>,
    pub types: Arc<TypeRegistry>,
    pub provinces: Arc<ProvinceRegistry>,
    pub config: SearchConfig,
    pub filters: SearchFilters,
}

impl TestWorld {
    pub fn new() -> Self {
        Self {
            gazetteer: Arc::new(FakeGazetteer::new()),
            types: Arc::new(TypeRegistry::from_definitions(
                Language::English,
                default_type_definitions(),
            )),
            provinces: Arc::new(ProvinceRegistry::from_definitions(
                Language::English,
                default_province_definitions(),
            )),
            config: SearchConfig::default(),
            filters: SearchFilters::default(),
        }
    }

    pub fn ctx(&self) -> ResolveContext<'_> {
        ResolveContext {
            gazetteer: &*self.gazetteer,
            types: &self.types,
            provinces: &self.provinces,
            config: &self.config,
            filters: &self.filters,
        }
    }
}
