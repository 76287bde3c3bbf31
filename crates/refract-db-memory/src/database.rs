use std::sync::Arc;

use papaya::HashMap as PapayaHashMap;
use refract_core::EntityCatalog;
use refract_storage::RepositoryRegistry;
use tracing::debug;

use crate::repository::InMemoryRepository;

/// A set of in-memory collections, one per entity alias.
#[derive(Debug, Default)]
pub struct InMemoryDatabase {
    collections: PapayaHashMap<String, Arc<InMemoryRepository>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collection named `name`, creating it on first access.
    pub fn collection(&self, name: &str) -> Arc<InMemoryRepository> {
        let guard = self.collections.pin();
        guard
            .get_or_insert_with(name.to_string(), || {
                debug!(collection = %name, "Creating in-memory collection");
                Arc::new(InMemoryRepository::new(name))
            })
            .clone()
    }

    /// Builds a registry binding each alias to its collection.
    pub fn registry_for<'a>(&self, aliases: impl IntoIterator<Item = &'a str>) -> RepositoryRegistry {
        let mut registry = RepositoryRegistry::new();
        for alias in aliases {
            registry.register(alias, self.collection(alias));
        }
        registry
    }

    /// Builds a registry covering every entity in the catalog.
    pub fn registry_for_catalog(&self, catalog: &EntityCatalog) -> RepositoryRegistry {
        self.registry_for(catalog.aliases())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use refract_core::{EntitySchema, PropertyType};
    use refract_storage::Repository;
    use serde_json::json;

    #[tokio::test]
    async fn test_collection_is_shared() {
        let db = InMemoryDatabase::new();
        db.collection("product")
            .create(&json!({"name": "Chair"}))
            .await
            .unwrap();
        assert_eq!(db.collection("product").len(), 1);
        assert!(db.collection("news").is_empty());
    }

    #[tokio::test]
    async fn test_registry_for_catalog() {
        let catalog = EntityCatalog::from_schemas([
            EntitySchema::new("product")
                .unwrap()
                .property("name", PropertyType::string()),
            EntitySchema::new("settings").unwrap().max_one(true),
        ])
        .unwrap();

        let db = InMemoryDatabase::new();
        let registry = db.registry_for_catalog(&catalog);
        assert_eq!(registry.len(), 2);

        let repo = registry.get("settings").unwrap();
        assert_eq!(repo.collection(), "settings");
        assert_eq!(repo.backend_name(), "memory");
    }
}
