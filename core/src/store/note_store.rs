use std::sync::Arc;

use chrono::Utc;
use log::info;

use crate::editor::NoteDraft;
use crate::id::IdGenerator;
use crate::model::{Entity, Note, NotePatch, TagSet};
use crate::repository::DocumentAdapter;
use crate::store::entity_store::EntityStore;
use crate::store::error::StoreError;

/// Tagged notes. New notes are prepended so the newest comes first.
pub struct NoteStore<A: DocumentAdapter<Note>> {
    store: EntityStore<Note, A>,
    ids: Arc<dyn IdGenerator>,
}

impl<A: DocumentAdapter<Note>> NoteStore<A> {
    pub fn new(adapter: Arc<A>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            store: EntityStore::new(adapter),
            ids,
        }
    }

    pub fn entities(&self) -> &EntityStore<Note, A> {
        &self.store
    }

    pub fn notes(&self) -> Vec<Note> {
        self.store.snapshot()
    }

    pub fn favorites(&self) -> Vec<Note> {
        self.store
            .snapshot()
            .into_iter()
            .filter(|n| n.is_favorite)
            .collect()
    }

    pub fn with_tag(&self, tag: &str) -> Vec<Note> {
        self.store
            .snapshot()
            .into_iter()
            .filter(|n| n.tags.contains(tag))
            .collect()
    }

    /// Every tag in use, in first-seen order.
    pub fn all_tags(&self) -> TagSet {
        let notes = self.store.snapshot();
        notes.iter().flat_map(|n| n.tags.iter()).collect()
    }

    pub fn get(&self, id: &str) -> Option<Note> {
        self.store.get(id)
    }

    pub fn resolve_id(&self, input: &str) -> Result<String, StoreError> {
        self.store.resolve_id(input)
    }

    pub fn is_loading(&self) -> bool {
        self.store.is_loading()
    }

    pub async fn load(&self) -> usize {
        self.store.load().await
    }

    pub async fn add(&self, title: &str, content: &str, tags: TagSet) -> Result<Note, StoreError> {
        let note = Note::new(
            self.ids.generate(Note::KIND),
            title.to_string(),
            content.to_string(),
            tags,
            Utc::now(),
        );
        let note = self.store.insert(note).await?;
        info!("Added note {}", note.id);
        Ok(note)
    }

    pub async fn update(&self, id: &str, patch: NotePatch) -> Result<Note, StoreError> {
        self.store.update(id, patch).await
    }

    /// Stores the editor state as one update.
    pub async fn save_draft(&self, id: &str, draft: &NoteDraft) -> Result<Note, StoreError> {
        self.update(id, draft.finalize()).await
    }

    pub async fn delete(&self, id: &str) -> Result<Note, StoreError> {
        let note = self.store.delete(id).await?;
        info!("Deleted note {}", note.id);
        Ok(note)
    }

    pub async fn toggle_favorite(&self, id: &str) -> Result<Note, StoreError> {
        self.store
            .update_with(id, |note| NotePatch::favorite(!note.is_favorite))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::UuidIdGenerator;
    use crate::store::testing::MockAdapter;

    fn store(adapter: Arc<MockAdapter<Note>>) -> NoteStore<MockAdapter<Note>> {
        NoteStore::new(adapter, Arc::new(UuidIdGenerator))
    }

    #[tokio::test]
    async fn test_new_notes_are_prepended() {
        let notes = store(Arc::new(MockAdapter::without_target()));

        notes.add("old", "", TagSet::new()).await.unwrap();
        let newest = notes.add("new", "", TagSet::new()).await.unwrap();

        assert_eq!(notes.notes()[0], newest);
        assert!(newest.id.starts_with("note-"));
        assert!(!newest.is_favorite);
    }

    #[tokio::test]
    async fn test_toggle_favorite() {
        let adapter = Arc::new(MockAdapter::with_target());
        let notes = store(adapter.clone());
        let note = notes.add("a", "", TagSet::new()).await.unwrap();

        assert!(notes.toggle_favorite(&note.id).await.unwrap().is_favorite);
        assert_eq!(notes.favorites().len(), 1);
        assert!(!notes.toggle_favorite(&note.id).await.unwrap().is_favorite);
        assert_eq!(adapter.save_count(), 3);
    }

    #[tokio::test]
    async fn test_toggle_favorite_on_missing_note() {
        let adapter = Arc::new(MockAdapter::with_target());
        let notes = store(adapter.clone());

        let err = notes.toggle_favorite("note-nope").await.unwrap_err();

        assert!(matches!(err, StoreError::NotFound { .. }));
        assert_eq!(adapter.save_count(), 0);
    }

    #[tokio::test]
    async fn test_save_draft_derives_title() {
        let notes = store(Arc::new(MockAdapter::with_target()));
        let note = notes.add("", "", TagSet::new()).await.unwrap();

        let mut draft = NoteDraft::from_note(&note);
        draft.content = "Hello\nWorld".into();
        draft.tag_input = "inbox".into();
        draft.add_tag();
        let saved = notes.save_draft(&note.id, &draft).await.unwrap();

        assert_eq!(saved.title, "Hello");
        assert_eq!(saved.content, "Hello\nWorld");
        assert!(saved.tags.contains("inbox"));
        assert_eq!(notes.get(&note.id), Some(saved));
    }

    #[tokio::test]
    async fn test_failed_toggle_reverts() {
        let adapter = Arc::new(MockAdapter::with_target());
        let notes = store(adapter.clone());
        let note = notes.add("a", "", TagSet::new()).await.unwrap();

        adapter.fail_next(1);
        assert!(notes.toggle_favorite(&note.id).await.unwrap_err().is_rollback());
        assert!(!notes.get(&note.id).unwrap().is_favorite);
    }

    #[tokio::test]
    async fn test_tag_queries() {
        let notes = store(Arc::new(MockAdapter::without_target()));
        let work: TagSet = ["work", "rust"].into_iter().collect();
        let home: TagSet = ["home", "rust"].into_iter().collect();
        notes.add("w", "", work).await.unwrap();
        notes.add("h", "", home).await.unwrap();

        assert_eq!(notes.with_tag("rust").len(), 2);
        assert_eq!(notes.with_tag("work").len(), 1);
        assert_eq!(
            notes.all_tags().iter().collect::<Vec<_>>(),
            vec!["home", "rust", "work"]
        );
    }
}
