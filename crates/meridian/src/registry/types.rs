use std::sync::{
    Arc, Mutex, RwLock,
    atomic::{AtomicBool, Ordering},
};

use ahash::AHashMap;
use meridian_gazetteer::{Definition, GazetteerApi, GazetteerError, Language};
use tracing::{debug, instrument};

/// The concise type-code dictionary for one language.
///
/// `all_types` is immutable after load. `valid_types` starts as a copy and
/// shrinks as exclusions are applied; generic search results whose type code
/// is not in the valid view are dropped. Filtering never touches
/// `all_types`, so [`reset_valid_types`](Self::reset_valid_types) can always
/// restore the full view.
#[derive(Debug)]
pub struct TypeRegistry {
    language: Language,
    all: AHashMap<String, String>,
    valid: RwLock<AHashMap<String, String>>,
    filter_complete: AtomicBool,
}

impl TypeRegistry {
    pub fn from_definitions(language: Language, definitions: Vec<Definition>) -> Self {
        let all: AHashMap<String, String> = definitions
            .into_iter()
            .map(|def| {
                let name = def.description.unwrap_or_else(|| def.term.clone());
                (def.code.to_uppercase(), name)
            })
            .collect();
        let valid = RwLock::new(all.clone());

        Self {
            language,
            all,
            valid,
            filter_complete: AtomicBool::new(false),
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn all_types(&self) -> &AHashMap<String, String> {
        &self.all
    }

    /// Snapshot of the current valid-type view.
    pub fn valid_types(&self) -> AHashMap<String, String> {
        self.valid.read().expect("type registry lock").clone()
    }

    pub fn is_valid(&self, code: &str) -> bool {
        self.valid
            .read()
            .expect("type registry lock")
            .contains_key(&code.to_uppercase())
    }

    /// Display name for a code from the full dictionary, whether or not the
    /// code has been excluded.
    pub fn describe(&self, code: &str) -> Option<String> {
        self.all.get(&code.to_uppercase()).cloned()
    }

    /// Remove `exclude` codes from the valid view and return a snapshot.
    ///
    /// Idempotent: excluding the same codes again is a no-op, and once any
    /// filtering has happened a call with no codes returns the memoized view
    /// without rescanning.
    pub fn filter_valid_types<I, S>(&self, exclude: I) -> AHashMap<String, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let exclude: Vec<String> = exclude
            .into_iter()
            .map(|code| code.as_ref().to_uppercase())
            .collect();

        let mut valid = self.valid.write().expect("type registry lock");
        if exclude.is_empty() && self.filter_complete.load(Ordering::Acquire) {
            return valid.clone();
        }

        for code in &exclude {
            valid.remove(code);
        }
        self.filter_complete.store(true, Ordering::Release);
        valid.clone()
    }

    pub fn is_filter_complete(&self) -> bool {
        self.filter_complete.load(Ordering::Acquire)
    }

    /// Restore the valid view to the full dictionary.
    pub fn reset_valid_types(&self) {
        let mut valid = self.valid.write().expect("type registry lock");
        *valid = self.all.clone();
        self.filter_complete.store(false, Ordering::Release);
    }
}

/// Per-language cache of [`TypeRegistry`] instances.
///
/// The first call for a language loads the dictionary from the gazetteer
/// and retains it; later calls return the cached instance. Under concurrent
/// first loads, the first insert wins and the duplicate load is discarded.
pub struct TypeStore {
    gazetteer: Arc<dyn GazetteerApi>,
    cache: Mutex<AHashMap<Language, Arc<TypeRegistry>>>,
}

impl TypeStore {
    pub fn new(gazetteer: Arc<dyn GazetteerApi>) -> Self {
        Self {
            gazetteer,
            cache: Mutex::new(AHashMap::new()),
        }
    }

    #[instrument(name = "Type Registry", level = "debug", skip(self))]
    pub async fn for_language(
        &self,
        language: Language,
    ) -> Result<Arc<TypeRegistry>, GazetteerError> {
        if let Some(registry) = self.cache.lock().expect("type store lock").get(&language) {
            return Ok(Arc::clone(registry));
        }

        debug!(%language, "loading type definitions");
        let definitions = self.gazetteer.type_definitions(language).await?;
        let registry = Arc::new(TypeRegistry::from_definitions(language, definitions));

        let mut cache = self.cache.lock().expect("type store lock");
        Ok(Arc::clone(cache.entry(language).or_insert(registry)))
    }
}
