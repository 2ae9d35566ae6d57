use meridian_gazetteer::{Endpoints, Language};

/// Session-wide search configuration.
///
/// Everything here is fixed for the lifetime of a searcher; the dynamic
/// per-session constraints (province, extent, type exclusion) live in
/// [`SearchFilters`](crate::SearchFilters) instead.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub language: Language,
    pub endpoints: Endpoints,
    /// Cap on the number of candidates requested from the place-name
    /// service.
    pub max_results: u32,
    /// Concise type codes sent as a server-side include-list (empty = all).
    pub categories: Vec<String>,
    /// Ranking of type codes for generic results; unranked codes sort last.
    pub sort_order: Vec<String>,
    /// Restrict the place-name service to official names.
    pub official_only: bool,
    /// Type codes removed from the registry's valid view at startup.
    pub exclude_types: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            language: Language::English,
            endpoints: Endpoints::default(),
            max_results: 100,
            categories: Vec::new(),
            sort_order: Vec::new(),
            official_only: false,
            exclude_types: Vec::new(),
        }
    }
}

impl SearchConfig {
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::new()
    }
}

/// Builder for creating search configurations with ergonomic defaults
#[derive(Debug, Clone, Default)]
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    /// Create a new builder with sensible defaults
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    /// Create a builder optimized for fast interactive lookups (fewer
    /// candidates per keystroke)
    pub fn fast() -> Self {
        let mut builder = Self::new();
        builder.config.max_results = 20;
        builder
    }

    /// Create a builder optimized for comprehensive searches (more
    /// candidates, official and unofficial names)
    pub fn comprehensive() -> Self {
        let mut builder = Self::new();
        builder.config.max_results = 250;
        builder.config.official_only = false;
        builder
    }

    /// Set the service language
    pub fn language(mut self, language: Language) -> Self {
        self.config.language = language;
        self
    }

    /// Override the service endpoints (e.g. to point at a mirror)
    pub fn endpoints(mut self, endpoints: Endpoints) -> Self {
        self.config.endpoints = endpoints;
        self
    }

    /// Set the maximum number of candidates to request (clamped to 1..=1000)
    pub fn max_results(mut self, max_results: u32) -> Self {
        self.config.max_results = max_results.clamp(1, 1000);
        self
    }

    /// Restrict generic searches to the given concise type codes
    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.categories = categories.into_iter().map(Into::into).collect();
        self
    }

    /// Rank generic results by type code in the given order
    pub fn sort_order<I, S>(mut self, order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.sort_order = order.into_iter().map(Into::into).collect();
        self
    }

    /// Only accept officially named places
    pub fn official_only(mut self, official_only: bool) -> Self {
        self.config.official_only = official_only;
        self
    }

    /// Exclude the given type codes from the registry's valid view
    pub fn exclude_types<I, S>(mut self, exclude: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.exclude_types = exclude.into_iter().map(Into::into).collect();
        self
    }

    /// Build the final configuration
    pub fn build(self) -> SearchConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builder() {
        let config = SearchConfigBuilder::new().build();
        assert_eq!(config.max_results, 100);
        assert_eq!(config.language, Language::English);
        assert!(!config.official_only);
        assert!(config.categories.is_empty());
    }

    #[test]
    fn test_fast_preset() {
        let config = SearchConfigBuilder::fast().build();
        assert_eq!(config.max_results, 20);
    }

    #[test]
    fn test_comprehensive_preset() {
        let config = SearchConfigBuilder::comprehensive().build();
        assert_eq!(config.max_results, 250);
    }

    #[test]
    fn test_method_chaining() {
        let config = SearchConfigBuilder::new()
            .language(Language::French)
            .max_results(30)
            .categories(["CITY", "TOWN"])
            .sort_order(["CITY"])
            .official_only(true)
            .exclude_types(["UNP"])
            .build();

        assert_eq!(config.language, Language::French);
        assert_eq!(config.max_results, 30);
        assert_eq!(config.categories, ["CITY", "TOWN"]);
        assert_eq!(config.sort_order, ["CITY"]);
        assert!(config.official_only);
        assert_eq!(config.exclude_types, ["UNP"]);
    }

    #[test]
    fn test_max_results_clamped() {
        assert_eq!(SearchConfigBuilder::new().max_results(0).build().max_results, 1);
        assert_eq!(
            SearchConfigBuilder::new().max_results(5000).build().max_results,
            1000
        );
    }

    #[test]
    fn test_preset_values_can_be_overridden() {
        let config = SearchConfigBuilder::fast().max_results(75).build();
        assert_eq!(config.max_results, 75);
    }
}
