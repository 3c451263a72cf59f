//! Repository and list queries over a [`MemoryStore`].

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crudhub_core::result::AppResult;
use crudhub_core::traits::{CrudObject, FilterQueryRepository, ListQuery, ObjectRepository};
use crudhub_core::types::{FilterData, IdentifierValue};

use super::MemoryStore;
use super::criteria::FilterCriteria;

/// Read access to the committed objects of one class.
#[derive(Debug)]
pub struct MemoryRepository<E> {
    store: Arc<MemoryStore<E>>,
}

impl<E: CrudObject> MemoryRepository<E> {
    /// Creates a repository over `store`.
    pub fn new(store: Arc<MemoryStore<E>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<E: CrudObject> ObjectRepository<E> for MemoryRepository<E> {
    async fn find(&self, id: &IdentifierValue) -> AppResult<Option<E>> {
        Ok(self.store.get(id))
    }

    fn filter_query(&self) -> Option<&dyn FilterQueryRepository<E>> {
        Some(self as &dyn FilterQueryRepository<E>)
    }
}

#[async_trait]
impl<E: CrudObject> FilterQueryRepository<E> for MemoryRepository<E> {
    async fn query_for_filter(&self, data: &FilterData) -> AppResult<Box<dyn ListQuery<E>>> {
        let criteria = FilterCriteria::from_filter(data)?;

        let mut rows = Vec::with_capacity(self.store.len());
        for object in self.store.all() {
            let value = serde_json::to_value(&object)?;
            if criteria.matches(&value) {
                rows.push((value, object));
            }
        }
        rows.sort_by(|a, b| criteria.compare(&a.0, &b.0));

        debug!(
            class = %self.store.metadata().name,
            conditions = criteria.fields.len(),
            matched = rows.len(),
            "Prepared list query"
        );
        Ok(Box::new(MemoryQuery::new(
            rows.into_iter().map(|(_, object)| object).collect(),
        )))
    }
}

/// A materialized list query.
#[derive(Debug, Clone)]
pub struct MemoryQuery<E> {
    items: Vec<E>,
}

impl<E: CrudObject> MemoryQuery<E> {
    /// Wraps already filtered and ordered objects.
    pub fn new(items: Vec<E>) -> Self {
        Self { items }
    }
}

#[async_trait]
impl<E: CrudObject> ListQuery<E> for MemoryQuery<E> {
    async fn count(&self) -> AppResult<u64> {
        Ok(self.items.len() as u64)
    }

    async fn fetch(&self, offset: u64, limit: u64) -> AppResult<Vec<E>> {
        Ok(self
            .items
            .iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crudhub_core::traits::ClassMetadata;
    use serde::{Deserialize, Serialize};
    use serde_json::json;
    use validator::Validate;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
    struct Book {
        id: Option<i64>,
        title: String,
        year: i64,
    }

    fn repository() -> MemoryRepository<Book> {
        let store = Arc::new(MemoryStore::new(ClassMetadata::new("Book", "id")));
        store
            .seed(
                [("Rust in Action", 2021), ("Programming Rust", 2017), ("SICP", 1985)]
                    .into_iter()
                    .map(|(title, year)| Book {
                        id: None,
                        title: title.to_string(),
                        year,
                    }),
            )
            .unwrap();
        MemoryRepository::new(store)
    }

    #[tokio::test]
    async fn test_find() {
        let repo = repository();
        assert_eq!(
            repo.find(&IdentifierValue::Int(3)).await.unwrap().unwrap().title,
            "SICP"
        );
        assert!(repo.find(&IdentifierValue::Int(4)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_filter_and_sort() {
        let repo = repository();
        let data = FilterData::new()
            .with("title", json!("rust"))
            .with("sort", json!("year"));
        let query = repo
            .filter_query()
            .unwrap()
            .query_for_filter(&data)
            .await
            .unwrap();
        assert_eq!(query.count().await.unwrap(), 2);
        let titles: Vec<String> = query
            .fetch(0, 10)
            .await
            .unwrap()
            .into_iter()
            .map(|b| b.title)
            .collect();
        assert_eq!(titles, vec!["Programming Rust", "Rust in Action"]);
    }

    #[tokio::test]
    async fn test_fetch_window() {
        let repo = repository();
        let query = repo
            .query_for_filter(&FilterData::default())
            .await
            .unwrap();
        assert_eq!(query.fetch(1, 1).await.unwrap()[0].title, "Programming Rust");
        assert!(query.fetch(5, 10).await.unwrap().is_empty());
    }
}
