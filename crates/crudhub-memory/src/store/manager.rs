//! Unit-of-work object manager over a [`MemoryStore`].

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tracing::{debug, info};

use crudhub_core::error::AppError;
use crudhub_core::result::AppResult;
use crudhub_core::traits::{ClassMetadata, CrudObject, ObjectManager, ObjectRepository};
use crudhub_core::types::IdentifierValue;

use super::MemoryStore;
use super::repository::MemoryRepository;

/// A staged change, applied on flush.
#[derive(Debug, Clone)]
enum Change<E> {
    Upsert(IdentifierValue, E),
    Remove(IdentifierValue),
}

/// Stages persists and removals and applies them to the store on flush.
#[derive(Debug)]
pub struct MemoryObjectManager<E> {
    store: Arc<MemoryStore<E>>,
    pending: Mutex<Vec<Change<E>>>,
}

impl<E: CrudObject> MemoryObjectManager<E> {
    /// Opens a unit of work over `store`.
    pub fn new(store: Arc<MemoryStore<E>>) -> Self {
        Self {
            store,
            pending: Mutex::new(Vec::new()),
        }
    }

    /// Number of changes not yet flushed.
    pub fn pending_changes(&self) -> AppResult<usize> {
        Ok(self.pending()?.len())
    }

    fn pending(&self) -> AppResult<MutexGuard<'_, Vec<Change<E>>>> {
        self.pending
            .lock()
            .map_err(|_| AppError::internal("Unit of work lock poisoned"))
    }

    fn ensure_managed(&self, class: &str) -> AppResult<()> {
        if class == self.store.metadata().name {
            Ok(())
        } else {
            Err(AppError::configuration(format!(
                "Class {class} is not managed by the object manager of {}",
                self.store.metadata().name
            )))
        }
    }

    /// Fails before anything is written when a staged removal targets an
    /// object that neither the store nor an earlier change holds.
    fn check_removals(&self, changes: &[Change<E>]) -> AppResult<()> {
        let mut staged: HashMap<&IdentifierValue, bool> = HashMap::new();
        for change in changes {
            match change {
                Change::Upsert(id, _) => {
                    staged.insert(id, true);
                }
                Change::Remove(id) => {
                    let present = staged
                        .get(id)
                        .copied()
                        .unwrap_or_else(|| self.store.contains(id));
                    if !present {
                        return Err(AppError::persistence(format!(
                            "There is no stored {} with identifier {id}",
                            self.store.metadata().name
                        )));
                    }
                    staged.insert(id, false);
                }
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<E: CrudObject> ObjectManager<E> for MemoryObjectManager<E> {
    fn class_metadata(&self, class: &str) -> AppResult<ClassMetadata> {
        self.ensure_managed(class)?;
        Ok(self.store.metadata().clone())
    }

    fn repository(&self, class: &str) -> AppResult<Arc<dyn ObjectRepository<E>>> {
        self.ensure_managed(class)?;
        Ok(Arc::new(MemoryRepository::new(self.store.clone())))
    }

    async fn persist(&self, object: &mut E) -> AppResult<()> {
        let id = self.store.assign_identifier(object)?;
        debug!(class = %self.store.metadata().name, id = %id, "Staged persist");
        self.pending()?.push(Change::Upsert(id, object.clone()));
        Ok(())
    }

    async fn remove(&self, object: &E) -> AppResult<()> {
        let id = self.store.identifier_of(object)?.ok_or_else(|| {
            AppError::persistence("Cannot remove an object that has no identifier")
        })?;
        debug!(class = %self.store.metadata().name, id = %id, "Staged removal");
        self.pending()?.push(Change::Remove(id));
        Ok(())
    }

    async fn flush(&self) -> AppResult<()> {
        let changes: Vec<Change<E>> = self.pending()?.drain(..).collect();
        self.check_removals(&changes)?;

        let count = changes.len();
        for change in changes {
            match change {
                Change::Upsert(id, object) => self.store.insert(id, object),
                Change::Remove(id) => {
                    self.store.remove(&id);
                }
            }
        }
        info!(class = %self.store.metadata().name, count, "Flushed unit of work");
        Ok(())
    }
}
