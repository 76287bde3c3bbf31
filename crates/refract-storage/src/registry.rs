//! Alias-keyed repository handles.

use std::collections::HashMap;
use std::sync::Arc;

use crate::traits::Repository;

/// Repository handles keyed by entity alias.
#[derive(Clone, Default)]
pub struct RepositoryRegistry {
    repositories: HashMap<String, Arc<dyn Repository>>,
}

impl RepositoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a repository to an entity alias, replacing any previous binding.
    pub fn register(&mut self, alias: impl Into<String>, repository: Arc<dyn Repository>) {
        self.repositories.insert(alias.into(), repository);
    }

    /// Builder-style variant of [`RepositoryRegistry::register`].
    #[must_use]
    pub fn with(mut self, alias: impl Into<String>, repository: Arc<dyn Repository>) -> Self {
        self.register(alias, repository);
        self
    }

    /// Returns the repository bound to `alias`.
    pub fn get(&self, alias: &str) -> Option<Arc<dyn Repository>> {
        self.repositories.get(alias).cloned()
    }

    pub fn contains(&self, alias: &str) -> bool {
        self.repositories.contains_key(alias)
    }

    pub fn len(&self) -> usize {
        self.repositories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.repositories.is_empty()
    }
}

impl std::fmt::Debug for RepositoryRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut aliases: Vec<_> = self.repositories.keys().collect();
        aliases.sort();
        f.debug_struct("RepositoryRegistry")
            .field("aliases", &aliases)
            .finish()
    }
}
