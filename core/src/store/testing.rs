//! Scriptable adapter for store tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::model::Entity;
use crate::repository::{Document, DocumentAdapter};

pub struct MockAdapter<E> {
    target: AtomicBool,
    failing_saves: AtomicUsize,
    failing_loads: AtomicBool,
    saves: Mutex<Vec<Document<E>>>,
    stored: Mutex<Option<Document<E>>>,
    gate: Option<Arc<Semaphore>>,
}

impl<E: Entity> MockAdapter<E> {
    fn new(target: bool) -> Self {
        Self {
            target: AtomicBool::new(target),
            failing_saves: AtomicUsize::new(0),
            failing_loads: AtomicBool::new(false),
            saves: Mutex::new(Vec::new()),
            stored: Mutex::new(None),
            gate: None,
        }
    }

    pub fn with_target() -> Self {
        Self::new(true)
    }

    pub fn without_target() -> Self {
        Self::new(false)
    }

    /// Every save waits for one permit of `gate`.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// The next `count` saves fail.
    pub fn fail_next(&self, count: usize) {
        self.failing_saves.store(count, Ordering::SeqCst);
    }

    pub fn fail_loads(&self, fail: bool) {
        self.failing_loads.store(fail, Ordering::SeqCst);
    }

    pub fn store_document(&self, entities: Vec<E>) {
        *self.stored.lock().unwrap() = Some(Document::new(entities));
    }

    /// Every document passed to `save`, including failed attempts.
    pub fn saves(&self) -> Vec<Document<E>> {
        self.saves.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().unwrap().len()
    }

    pub fn last_saved(&self) -> Option<Vec<E>> {
        self.saves.lock().unwrap().last().map(|d| d.entities.clone())
    }
}

#[async_trait]
impl<E: Entity> DocumentAdapter<E> for MockAdapter<E> {
    fn has_target(&self) -> bool {
        self.target.load(Ordering::SeqCst)
    }

    async fn load(&self) -> Result<Option<Document<E>>> {
        if self.failing_loads.load(Ordering::SeqCst) {
            return Err(anyhow!("simulated read failure"));
        }
        Ok(self.stored.lock().unwrap().clone())
    }

    async fn save(&self, document: &Document<E>) -> Result<()> {
        if let Some(gate) = &self.gate {
            gate.acquire().await?.forget();
        }

        self.saves.lock().unwrap().push(document.clone());

        let should_fail = self
            .failing_saves
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if should_fail {
            return Err(anyhow!("simulated write failure"));
        }

        *self.stored.lock().unwrap() = Some(document.clone());
        Ok(())
    }
}
