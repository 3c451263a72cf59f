//! Persistence capabilities: manager registry, object manager, repositories.
//!
//! The shape follows a unit-of-work persistence layer: changes are staged
//! with [`ObjectManager::persist`] / [`ObjectManager::remove`] and written by
//! [`ObjectManager::flush`].

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::AppError;
use crate::result::AppResult;
use crate::traits::object::CrudObject;
use crate::types::filter::FilterData;
use crate::types::id::IdentifierValue;

/// Mapping metadata of a managed class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassMetadata {
    /// Class name.
    pub name: String,
    /// Identifier field names; exactly one is supported.
    pub identifier: Vec<String>,
}

impl ClassMetadata {
    /// Metadata for a class with a single identifier field.
    pub fn new(name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            identifier: vec![identifier.into()],
        }
    }

    /// The single identifier field name.
    ///
    /// Composite identifiers are rejected with a configuration error.
    pub fn single_identifier(&self) -> AppResult<&str> {
        match self.identifier.as_slice() {
            [field] => Ok(field),
            _ => Err(AppError::configuration(
                "There are multiple fields define the identifier, which is not supported!",
            )),
        }
    }
}

/// Looks up the object manager responsible for a class.
pub trait ManagerRegistry<E: CrudObject>: Send + Sync {
    /// The manager for `class`, or `None` when the class is not managed.
    fn manager_for_class(&self, class: &str) -> Option<Arc<dyn ObjectManager<E>>>;
}

/// Stages and commits changes to managed objects.
#[async_trait]
pub trait ObjectManager<E: CrudObject>: Send + Sync {
    /// Mapping metadata for `class`.
    fn class_metadata(&self, class: &str) -> AppResult<ClassMetadata>;

    /// The repository for `class`.
    fn repository(&self, class: &str) -> AppResult<Arc<dyn ObjectRepository<E>>>;

    /// Stage `object` for insertion or update. Implementations may assign
    /// the identifier here.
    async fn persist(&self, object: &mut E) -> AppResult<()>;

    /// Stage `object` for removal.
    async fn remove(&self, object: &E) -> AppResult<()>;

    /// Commit all staged changes.
    async fn flush(&self) -> AppResult<()>;
}

/// Read access to the objects of one class.
#[async_trait]
pub trait ObjectRepository<E: CrudObject>: Send + Sync {
    /// Find an object by its identifier.
    async fn find(&self, id: &IdentifierValue) -> AppResult<Option<E>>;

    /// The filter-query capability, when this repository offers one.
    fn filter_query(&self) -> Option<&dyn FilterQueryRepository<E>> {
        None
    }
}

/// Repositories usable by list actions: build a query from filter data.
#[async_trait]
pub trait FilterQueryRepository<E: CrudObject>: Send + Sync {
    /// Build a query restricted by `data`.
    async fn query_for_filter(&self, data: &FilterData) -> AppResult<Box<dyn ListQuery<E>>>;
}

/// A prepared, not yet executed list query.
#[async_trait]
pub trait ListQuery<E: CrudObject>: Send + Sync {
    /// Total number of matching objects.
    async fn count(&self) -> AppResult<u64>;

    /// Up to `limit` matching objects, skipping the first `offset`.
    async fn fetch(&self, offset: u64, limit: u64) -> AppResult<Vec<E>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_single_identifier() {
        let meta = ClassMetadata::new("BlogPost", "id");
        assert_eq!(meta.single_identifier().unwrap(), "id");
    }

    #[test]
    fn test_composite_identifier_rejected() {
        let meta = ClassMetadata {
            name: "Membership".to_string(),
            identifier: vec!["user".to_string(), "group".to_string()],
        };
        let err = meta.single_identifier().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Configuration);
    }
}
