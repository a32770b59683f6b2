use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use anyhow::Result;
use log::{info, warn};

use crate::config::{AppConfig, ConfigStore};
use crate::model::{Note, Task};
use crate::repository::{DirectoryAdapter, TargetSelector};
use crate::store::{NoteStore, TaskStore};
use crate::view::{Screen, Selection, View};

/// Session-wide service object: the data directory, both stores and the
/// view selection. Created once and passed by reference to the UI.
pub struct Workspace {
    adapter: Arc<DirectoryAdapter>,
    tasks: TaskStore<DirectoryAdapter>,
    notes: NoteStore<DirectoryAdapter>,
    selection: RwLock<Selection>,
    config: RwLock<AppConfig>,
    config_store: Option<ConfigStore>,
}

impl Workspace {
    /// Builds the stores from `config` and loads both collections when a
    /// directory is remembered. With a `config_store`, newly selected
    /// directories are remembered for the next session.
    pub async fn open(config: AppConfig, config_store: Option<ConfigStore>) -> Self {
        let adapter = Arc::new(DirectoryAdapter::new(config.directory.clone()));
        let ids = config.id_strategy.generator();

        let workspace = Self {
            tasks: TaskStore::new(adapter.clone(), ids.clone()),
            notes: NoteStore::new(adapter.clone(), ids),
            adapter,
            selection: RwLock::new(Selection::default()),
            config: RwLock::new(config),
            config_store,
        };
        workspace.reload().await;
        workspace
    }

    pub fn tasks(&self) -> &TaskStore<DirectoryAdapter> {
        &self.tasks
    }

    pub fn notes(&self) -> &NoteStore<DirectoryAdapter> {
        &self.notes
    }

    pub fn has_directory(&self) -> bool {
        self.adapter.target_dir().is_some()
    }

    pub fn directory_name(&self) -> Option<String> {
        self.adapter.target_name()
    }

    pub fn directory(&self) -> Option<PathBuf> {
        self.adapter.target_dir()
    }

    pub fn is_loading(&self) -> bool {
        self.tasks.is_loading() || self.notes.is_loading()
    }

    /// Selects `dir` as the data directory and loads whatever it already
    /// holds. Returns whether the directory was accepted.
    pub async fn initialize_directory(&self, dir: &Path) -> Result<bool> {
        if !self.adapter.select_target(dir).await? {
            return Ok(false);
        }

        let selected = self.adapter.target_dir();
        let config = {
            let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
            config.directory = selected;
            config.clone()
        };
        if let Some(store) = &self.config_store {
            if let Err(e) = store.save(&config) {
                warn!("Failed to remember data directory: {:#}", e);
            }
        }

        self.reload().await;
        Ok(true)
    }

    async fn reload(&self) {
        let tasks = self.tasks.load().await;
        let notes = self.notes.load().await;
        if self.has_directory() {
            info!("Workspace ready with {} tasks and {} notes", tasks, notes);
        }
    }

    pub fn selection(&self) -> Selection {
        self.selection
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn show(&self, view: View) {
        self.with_selection(|s| s.show(view));
    }

    pub fn edit_task(&self, id: &str) {
        self.with_selection(|s| s.edit_task(id));
    }

    pub fn edit_note(&self, id: &str) {
        self.with_selection(|s| s.edit_note(id));
    }

    pub fn close_task_editor(&self) {
        self.with_selection(Selection::close_task_editor);
    }

    pub fn close_note_editor(&self) {
        self.with_selection(Selection::close_note_editor);
    }

    /// The screen to render for the current selection and collections.
    pub fn screen(&self) -> Screen {
        let find_task = |id: &str| -> Option<Task> { self.tasks.get(id) };
        let find_note = |id: &str| -> Option<Note> { self.notes.get(id) };
        self.with_selection(|s| s.resolve(find_task, find_note))
    }

    fn with_selection<T>(&self, f: impl FnOnce(&mut Selection) -> T) -> T {
        let mut selection = self.selection.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut selection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{TagSet, TaskStatus};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_without_directory_everything_stays_in_memory() {
        let workspace = Workspace::open(AppConfig::default(), None).await;

        assert!(!workspace.has_directory());
        let task = workspace.tasks().add("Buy milk", "").await.unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(workspace.tasks().tasks().len(), 1);
    }

    #[tokio::test]
    async fn test_initialize_directory_loads_existing_data_and_remembers_it() {
        let temp = TempDir::new().unwrap();
        let data_dir = temp.path().join("data");
        let config_store = ConfigStore::new(Some(temp.path().join("config.json"))).unwrap();

        {
            let first = Workspace::open(AppConfig::default(), None).await;
            assert!(first.initialize_directory(&data_dir).await.unwrap());
            first.tasks().add("persisted", "").await.unwrap();
            first.notes().add("idea", "body", TagSet::new()).await.unwrap();
        }

        let second = Workspace::open(AppConfig::default(), Some(config_store.clone())).await;
        assert!(second.tasks().tasks().is_empty());
        assert!(second.initialize_directory(&data_dir).await.unwrap());

        assert_eq!(second.tasks().tasks()[0].title, "persisted");
        assert_eq!(second.notes().notes()[0].title, "idea");
        assert_eq!(second.directory_name().as_deref(), Some("data"));

        let remembered = config_store.load().unwrap();
        let third = Workspace::open(remembered, None).await;
        assert_eq!(third.tasks().tasks().len(), 1);
    }

    #[tokio::test]
    async fn test_screen_falls_back_when_entity_is_deleted() {
        let workspace = Workspace::open(AppConfig::default(), None).await;
        let task = workspace.tasks().add("edit me", "").await.unwrap();

        workspace.edit_task(&task.id);
        assert!(matches!(workspace.screen(), Screen::TaskEditor(_)));

        workspace.tasks().delete(&task.id).await.unwrap();
        assert_eq!(workspace.screen(), Screen::Board);
        assert_eq!(workspace.selection().current_view, View::Board);
    }

    #[tokio::test]
    async fn test_note_editor_round_trip() {
        let workspace = Workspace::open(AppConfig::default(), None).await;
        let note = workspace.notes().add("n", "", TagSet::new()).await.unwrap();

        workspace.edit_note(&note.id);
        assert!(matches!(workspace.screen(), Screen::NoteEditor(n) if n.id == note.id));

        workspace.close_note_editor();
        assert_eq!(workspace.screen(), Screen::Notes);
    }
}
