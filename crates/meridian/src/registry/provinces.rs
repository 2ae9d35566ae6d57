use std::sync::{Arc, Mutex};

use ahash::AHashMap;
use meridian_gazetteer::{Definition, GazetteerApi, GazetteerError, Language};
use tracing::{debug, instrument};

/// First letter of a forward sortation area -> province abbreviations.
/// X covers both territories; every other letter is unambiguous.
const FSA_PROVINCES: &[(char, &[&str])] = &[
    ('A', &["NL"]),
    ('B', &["NS"]),
    ('C', &["PE"]),
    ('E', &["NB"]),
    ('G', &["QC"]),
    ('H', &["QC"]),
    ('J', &["QC"]),
    ('K', &["ON"]),
    ('L', &["ON"]),
    ('M', &["ON"]),
    ('N', &["ON"]),
    ('P', &["ON"]),
    ('R', &["MB"]),
    ('S', &["SK"]),
    ('T', &["AB"]),
    ('V', &["BC"]),
    ('X', &["NT", "NU"]),
    ('Y', &["YT"]),
];

/// Province abbreviations an FSA's first letter maps to.
pub fn fsa_to_province_abbrs(fsa: &str) -> &'static [&'static str] {
    let Some(first) = fsa.chars().next().map(|c| c.to_ascii_uppercase()) else {
        return &[];
    };
    FSA_PROVINCES
        .iter()
        .find(|(letter, _)| *letter == first)
        .map_or(&[], |(_, abbrs)| *abbrs)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Province {
    /// Numeric service code, e.g. Ontario is "35".
    pub code: String,
    /// Two-letter abbreviation, e.g. "ON".
    pub abbr: String,
    /// Full display name.
    pub name: String,
}

/// The province dictionary for one language. Immutable after load.
#[derive(Debug)]
pub struct ProvinceRegistry {
    language: Language,
    list: Vec<Province>,
    by_code: AHashMap<String, usize>,
    by_abbr: AHashMap<String, usize>,
}

impl ProvinceRegistry {
    pub fn from_definitions(language: Language, definitions: Vec<Definition>) -> Self {
        let list: Vec<Province> = definitions
            .into_iter()
            .map(|def| Province {
                code: def.code,
                name: def.description.unwrap_or_else(|| def.term.clone()),
                abbr: def.term,
            })
            .collect();
        let by_code = list
            .iter()
            .enumerate()
            .map(|(i, p)| (p.code.clone(), i))
            .collect();
        let by_abbr = list
            .iter()
            .enumerate()
            .map(|(i, p)| (p.abbr.to_uppercase(), i))
            .collect();

        Self {
            language,
            list,
            by_code,
            by_abbr,
        }
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn list(&self) -> &[Province] {
        &self.list
    }

    pub fn by_code(&self, code: &str) -> Option<&Province> {
        self.by_code.get(code).map(|&i| &self.list[i])
    }

    pub fn by_abbr(&self, abbr: &str) -> Option<&Province> {
        self.by_abbr.get(&abbr.to_uppercase()).map(|&i| &self.list[i])
    }

    pub fn name_for_code(&self, code: &str) -> Option<&str> {
        self.by_code(code).map(|p| p.name.as_str())
    }

    /// Provinces an FSA belongs to, resolved through this registry. FSAs
    /// starting with an unassigned letter yield an empty list.
    pub fn fsa_to_provinces(&self, fsa: &str) -> Vec<&Province> {
        fsa_to_province_abbrs(fsa)
            .iter()
            .filter_map(|abbr| self.by_abbr(abbr))
            .collect()
    }
}

/// Per-language cache of [`ProvinceRegistry`] instances, mirroring
/// [`TypeStore`](super::TypeStore).
pub struct ProvinceStore {
    gazetteer: Arc<dyn GazetteerApi>,
    cache: Mutex<AHashMap<Language, Arc<ProvinceRegistry>>>,
}

impl ProvinceStore {
    pub fn new(gazetteer: Arc<dyn GazetteerApi>) -> Self {
        Self {
            gazetteer,
            cache: Mutex::new(AHashMap::new()),
        }
    }

    #[instrument(name = "Province Registry", level = "debug", skip(self))]
    pub async fn for_language(
        &self,
        language: Language,
    ) -> Result<Arc<ProvinceRegistry>, GazetteerError> {
        if let Some(registry) = self
            .cache
            .lock()
            .expect("province store lock")
            .get(&language)
        {
            return Ok(Arc::clone(registry));
        }

        debug!(%language, "loading province definitions");
        let definitions = self.gazetteer.province_definitions(language).await?;
        let registry = Arc::new(ProvinceRegistry::from_definitions(language, definitions));

        let mut cache = self.cache.lock().expect("province store lock");
        Ok(Arc::clone(cache.entry(language).or_insert(registry)))
    }
}
