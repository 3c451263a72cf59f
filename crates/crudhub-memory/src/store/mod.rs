//! In-memory persistence: object store, manager registry, unit-of-work
//! object manager and filterable repository.

pub mod criteria;
pub mod manager;
pub mod repository;

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use dashmap::DashMap;
use serde_json::Value;
use tracing::info;

use crudhub_core::error::AppError;
use crudhub_core::result::AppResult;
use crudhub_core::traits::{ClassMetadata, CrudObject, ManagerRegistry, ObjectManager};
use crudhub_core::types::IdentifierValue;

pub use criteria::FilterCriteria;
pub use manager::MemoryObjectManager;
pub use repository::{MemoryQuery, MemoryRepository};

/// Committed objects of one class, keyed by identifier.
#[derive(Debug)]
pub struct MemoryStore<E> {
    metadata: ClassMetadata,
    objects: DashMap<IdentifierValue, E>,
    next_id: AtomicI64,
}

impl<E: CrudObject> MemoryStore<E> {
    /// Creates an empty store for the class described by `metadata`.
    pub fn new(metadata: ClassMetadata) -> Self {
        Self {
            metadata,
            objects: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    /// Mapping metadata of the stored class.
    pub fn metadata(&self) -> &ClassMetadata {
        &self.metadata
    }

    /// Looks up a committed object.
    pub fn get(&self, id: &IdentifierValue) -> Option<E> {
        self.objects.get(id).map(|entry| entry.value().clone())
    }

    /// All committed objects ordered by identifier.
    pub fn all(&self) -> Vec<E> {
        let mut entries: Vec<(IdentifierValue, E)> = self
            .objects
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries.into_iter().map(|(_, object)| object).collect()
    }

    /// Number of committed objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Commits `objects` directly, assigning identifiers where missing.
    pub fn seed(&self, objects: impl IntoIterator<Item = E>) -> AppResult<()> {
        let mut count = 0usize;
        for mut object in objects {
            let id = self.assign_identifier(&mut object)?;
            self.insert(id, object);
            count += 1;
        }
        info!(class = %self.metadata.name, count, "Seeded memory store");
        Ok(())
    }

    /// Reads the identifier field of `object`; `None` when unset.
    pub fn identifier_of(&self, object: &E) -> AppResult<Option<IdentifierValue>> {
        let field = self.metadata.single_identifier()?;
        let value = serde_json::to_value(object)?;
        match value.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Number(n)) => n.as_i64().map(IdentifierValue::Int).map(Some).ok_or_else(
                || AppError::persistence(format!("Identifier {field} is not an integer: {n}")),
            ),
            Some(Value::String(s)) if s.is_empty() => Ok(None),
            Some(Value::String(s)) => Ok(Some(IdentifierValue::Text(s.clone()))),
            Some(other) => Err(AppError::persistence(format!(
                "Identifier {field} has an unsupported type: {other}"
            ))),
        }
    }

    /// Returns the identifier of `object`, generating an integer one first
    /// when it has none.
    pub fn assign_identifier(&self, object: &mut E) -> AppResult<IdentifierValue> {
        if let Some(id) = self.identifier_of(object)? {
            return Ok(id);
        }
        let field = self.metadata.single_identifier()?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut value = serde_json::to_value(&*object)?;
        match value.as_object_mut() {
            Some(map) => {
                map.insert(field.to_string(), Value::from(id));
            }
            None => {
                return Err(AppError::persistence(format!(
                    "Objects of class {} must serialize to a map",
                    self.metadata.name
                )));
            }
        }
        *object = serde_json::from_value(value)?;
        Ok(IdentifierValue::Int(id))
    }

    pub(crate) fn insert(&self, id: IdentifierValue, object: E) {
        if let Some(n) = id.as_int() {
            self.next_id.fetch_max(n + 1, Ordering::SeqCst);
        }
        self.objects.insert(id, object);
    }

    pub(crate) fn contains(&self, id: &IdentifierValue) -> bool {
        self.objects.contains_key(id)
    }

    pub(crate) fn remove(&self, id: &IdentifierValue) -> Option<E> {
        self.objects.remove(id).map(|(_, object)| object)
    }
}

/// Maps class names to their stores and hands out object managers.
#[derive(Debug)]
pub struct MemoryRegistry<E> {
    stores: DashMap<String, Arc<MemoryStore<E>>>,
}

impl<E: CrudObject> Default for MemoryRegistry<E> {
    fn default() -> Self {
        Self {
            stores: DashMap::new(),
        }
    }
}

impl<E: CrudObject> MemoryRegistry<E> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a class and returns its (possibly existing) store.
    pub fn register(&self, metadata: ClassMetadata) -> Arc<MemoryStore<E>> {
        self.stores
            .entry(metadata.name.clone())
            .or_insert_with(|| Arc::new(MemoryStore::new(metadata)))
            .value()
            .clone()
    }

    /// The store of `class`, if registered.
    pub fn store(&self, class: &str) -> Option<Arc<MemoryStore<E>>> {
        self.stores.get(class).map(|entry| entry.value().clone())
    }
}

impl<E: CrudObject> ManagerRegistry<E> for MemoryRegistry<E> {
    /// Each call opens a fresh unit of work over the shared store.
    fn manager_for_class(&self, class: &str) -> Option<Arc<dyn ObjectManager<E>>> {
        self.store(class)
            .map(|store| Arc::new(MemoryObjectManager::new(store)) as Arc<dyn ObjectManager<E>>)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};
    use validator::Validate;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
    struct Tag {
        id: Option<i64>,
        label: String,
    }

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
    struct Page {
        slug: String,
    }

    fn tag(label: &str) -> Tag {
        Tag {
            id: None,
            label: label.to_string(),
        }
    }

    #[test]
    fn test_assign_identifier_writes_back() {
        let store = MemoryStore::<Tag>::new(ClassMetadata::new("Tag", "id"));
        let mut t = tag("rust");
        let id = store.assign_identifier(&mut t).unwrap();
        assert_eq!(id, IdentifierValue::Int(1));
        assert_eq!(t.id, Some(1));
        assert_eq!(store.assign_identifier(&mut t).unwrap(), IdentifierValue::Int(1));
    }

    #[test]
    fn test_seed_respects_existing_ids() {
        let store = MemoryStore::<Tag>::new(ClassMetadata::new("Tag", "id"));
        store
            .seed(vec![
                Tag {
                    id: Some(7),
                    label: "seven".to_string(),
                },
                tag("next"),
            ])
            .unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&IdentifierValue::Int(8)).unwrap().label, "next");
        let labels: Vec<String> = store.all().into_iter().map(|t| t.label).collect();
        assert_eq!(labels, vec!["seven", "next"]);
    }

    #[test]
    fn test_text_identifiers() {
        let store = MemoryStore::<Page>::new(ClassMetadata::new("Page", "slug"));
        store
            .seed(vec![Page {
                slug: "about".to_string(),
            }])
            .unwrap();
        assert!(store.get(&IdentifierValue::from("about")).is_some());
    }

    #[test]
    fn test_registry_hands_out_managers_for_known_classes() {
        let registry = MemoryRegistry::<Tag>::new();
        let first = registry.register(ClassMetadata::new("Tag", "id"));
        let second = registry.register(ClassMetadata::new("Tag", "id"));
        assert!(Arc::ptr_eq(&first, &second));
        assert!(registry.manager_for_class("Tag").is_some());
        assert!(registry.manager_for_class("Unknown").is_none());
    }
}
