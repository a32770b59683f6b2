use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use log::{debug, error, info, warn};
use tokio::sync::Mutex;

use crate::input::expand_key;
use crate::model::{Entity, Placement};
use crate::repository::{Document, DocumentAdapter};
use crate::store::error::StoreError;

/// In-memory collection of one entity kind with optimistic persistence.
///
/// Every mutation captures the current collection, applies the new one
/// immediately, then saves it through the adapter when a target is
/// configured. A failed save restores the captured collection.
///
/// Mutations on one store are serialized: the writer lock is held from the
/// snapshot until the save settles, so a rollback only ever undoes its own
/// change. Readers are never blocked by an in-flight save and see the
/// optimistic state.
pub struct EntityStore<E: Entity, A: DocumentAdapter<E>> {
    entities: RwLock<Vec<E>>,
    loading: AtomicBool,
    writer: Mutex<()>,
    adapter: Arc<A>,
}

impl<E: Entity, A: DocumentAdapter<E>> EntityStore<E, A> {
    pub fn new(adapter: Arc<A>) -> Self {
        Self {
            entities: RwLock::new(Vec::new()),
            loading: AtomicBool::new(false),
            writer: Mutex::new(()),
            adapter,
        }
    }

    pub fn snapshot(&self) -> Vec<E> {
        self.read().clone()
    }

    pub fn get(&self, id: &str) -> Option<E> {
        self.read().iter().find(|e| e.id() == id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    pub fn has_target(&self) -> bool {
        self.adapter.has_target()
    }

    /// Expands a full id, or an unambiguous prefix of the part after
    /// `<kind>-`, to the id of an existing entity.
    pub fn resolve_id(&self, input: &str) -> Result<String, StoreError> {
        let input = input.trim();
        let prefix = format!("{}-", E::KIND);
        let key = if input.starts_with(&prefix) {
            input.to_string()
        } else {
            format!("{}{}", prefix, input)
        };

        let entities = self.read();
        let candidates: Vec<&str> = entities.iter().map(|e| e.id()).collect();
        expand_key(&key, &candidates).map_err(|e| StoreError::InvalidId(format!("{} id: {}", E::KIND, e)))
    }

    /// Replaces the collection with the persisted document. Without a target,
    /// or when no document exists yet, the collection is left as it is.
    /// Failures are logged and keep the current collection.
    ///
    /// Returns the number of entities held afterwards.
    pub async fn load(&self) -> usize {
        let _writer = self.writer.lock().await;
        if !self.adapter.has_target() {
            debug!("No target configured, skipping {} load", E::KIND);
            return self.len();
        }

        self.loading.store(true, Ordering::Release);
        match self.adapter.load().await {
            Ok(Some(document)) => {
                info!("Loaded {} {} entries", document.entities.len(), E::KIND);
                *self.write() = document.entities;
            }
            Ok(None) => debug!("No {} document yet", E::KIND),
            Err(e) => error!("Failed to load {} data: {:#}", E::KIND, e),
        }
        self.loading.store(false, Ordering::Release);
        self.len()
    }

    pub async fn insert(&self, entity: E) -> Result<E, StoreError> {
        self.commit(move |entities| {
            if entities.iter().any(|e| e.id() == entity.id()) {
                return Err(StoreError::Duplicate {
                    kind: E::KIND,
                    id: entity.id().to_string(),
                });
            }
            match E::PLACEMENT {
                Placement::Append => entities.push(entity.clone()),
                Placement::Prepend => entities.insert(0, entity.clone()),
            }
            Ok(entity)
        })
        .await
    }

    pub async fn update(&self, id: &str, patch: E::Patch) -> Result<E, StoreError> {
        self.update_with(id, move |_| patch).await
    }

    /// Like [`update`](Self::update), with the patch computed from the
    /// entity's current value under the writer lock.
    pub async fn update_with<F>(&self, id: &str, make_patch: F) -> Result<E, StoreError>
    where
        F: FnOnce(&E) -> E::Patch + Send,
    {
        self.commit(move |entities| {
            let entity = entities
                .iter_mut()
                .find(|e| e.id() == id)
                .ok_or_else(|| StoreError::not_found(E::KIND, id))?;
            let patch = make_patch(entity);
            entity.apply(patch, Utc::now());
            Ok(entity.clone())
        })
        .await
    }

    pub async fn delete(&self, id: &str) -> Result<E, StoreError> {
        self.commit(move |entities| {
            let pos = entities
                .iter()
                .position(|e| e.id() == id)
                .ok_or_else(|| StoreError::not_found(E::KIND, id))?;
            Ok(entities.remove(pos))
        })
        .await
    }

    /// `mutate` must leave the collection untouched when it returns an error.
    async fn commit<T, F>(&self, mutate: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Vec<E>) -> Result<T, StoreError>,
    {
        let _writer = self.writer.lock().await;

        let (previous, next, output) = {
            let mut entities = self.write();
            let previous = entities.clone();
            let output = mutate(&mut entities)?;
            (previous, entities.clone(), output)
        };

        if !self.adapter.has_target() {
            debug!("No target configured, {} change kept in memory", E::KIND);
            return Ok(output);
        }

        match self.adapter.save(&Document::new(next)).await {
            Ok(()) => Ok(output),
            Err(e) => {
                warn!("Failed to save {} data, reverting: {:#}", E::KIND, e);
                *self.write() = previous;
                Err(StoreError::SaveFailed {
                    kind: E::KIND,
                    message: format!("{:#}", e),
                })
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, Vec<E>> {
        self.entities.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<E>> {
        self.entities.write().unwrap_or_else(PoisonError::into_inner)
    }
}
