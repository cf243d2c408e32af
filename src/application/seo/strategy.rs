use std::{collections::BTreeMap, sync::Arc};

use crate::domain::entities::{CompanyRecord, ServiceRecord};

use super::{barberias::BarberiasStrategy, types::RouteDescriptor, types::SeoDocument};

/// Resolved entities handed to a strategy.
#[derive(Debug, Clone, Copy)]
pub struct StrategyInput<'a> {
    pub company: &'a CompanyRecord,
    pub services: &'a [ServiceRecord],
    pub route: &'a RouteDescriptor,
    /// Present in service-detail mode.
    pub service: Option<&'a ServiceRecord>,
}

/// Category-specific mapping from directory entities to a [`SeoDocument`].
///
/// Implementations must be pure: identical input yields an identical document.
pub trait SeoStrategy: Send + Sync {
    fn category(&self) -> &'static str;

    fn build_seo(&self, input: &StrategyInput<'_>) -> SeoDocument;
}

/// Category id to strategy lookup.
#[derive(Clone)]
pub struct StrategyRegistry {
    strategies: BTreeMap<&'static str, Arc<dyn SeoStrategy>>,
}

impl StrategyRegistry {
    pub fn empty() -> Self {
        Self {
            strategies: BTreeMap::new(),
        }
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Arc::new(BarberiasStrategy));
        registry
    }

    /// Register a strategy under its own category id, replacing any previous one.
    pub fn register(&mut self, strategy: Arc<dyn SeoStrategy>) {
        self.strategies.insert(strategy.category(), strategy);
    }

    pub fn get(&self, category: &str) -> Option<Arc<dyn SeoStrategy>> {
        self.strategies.get(category).cloned()
    }

    pub fn contains(&self, category: &str) -> bool {
        self.strategies.contains_key(category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.strategies.keys().copied()
    }
}

impl Default for StrategyRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StrategyRegistry")
            .field("categories", &self.strategies.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_register_barberias() {
        let registry = StrategyRegistry::with_defaults();
        assert!(registry.contains("barberias"));
        assert!(registry.get("restaurantes").is_none());
        assert_eq!(registry.categories().collect::<Vec<_>>(), vec!["barberias"]);
    }

    #[test]
    fn empty_registry_has_no_categories() {
        let registry = StrategyRegistry::empty();
        assert_eq!(registry.categories().count(), 0);
    }
}
