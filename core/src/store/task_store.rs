use std::sync::Arc;

use chrono::Utc;
use log::info;

use crate::id::IdGenerator;
use crate::model::{Entity, Task, TaskPatch, TaskStatus};
use crate::repository::DocumentAdapter;
use crate::store::entity_store::EntityStore;
use crate::store::error::StoreError;

/// Board tasks. New tasks are appended and start in `todo`.
pub struct TaskStore<A: DocumentAdapter<Task>> {
    store: EntityStore<Task, A>,
    ids: Arc<dyn IdGenerator>,
}

impl<A: DocumentAdapter<Task>> TaskStore<A> {
    pub fn new(adapter: Arc<A>, ids: Arc<dyn IdGenerator>) -> Self {
        Self {
            store: EntityStore::new(adapter),
            ids,
        }
    }

    pub fn entities(&self) -> &EntityStore<Task, A> {
        &self.store
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.store.snapshot()
    }

    /// Tasks in one board column, in collection order.
    pub fn by_status(&self, status: TaskStatus) -> Vec<Task> {
        self.store
            .snapshot()
            .into_iter()
            .filter(|t| t.status == status)
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<Task> {
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

    /// Creates a task in `todo`. The title is taken as given; callers reject
    /// blank titles.
    pub async fn add(&self, title: &str, description: &str) -> Result<Task, StoreError> {
        self.add_with_status(title, description, TaskStatus::Todo).await
    }

    /// Creates a task directly in `status`, with a single save.
    pub async fn add_with_status(
        &self,
        title: &str,
        description: &str,
        status: TaskStatus,
    ) -> Result<Task, StoreError> {
        let mut task = Task::new(
            self.ids.generate(Task::KIND),
            title.to_string(),
            description.to_string(),
            Utc::now(),
        );
        task.status = status;
        let task = self.store.insert(task).await?;
        info!("Added task {}", task.id);
        Ok(task)
    }

    pub async fn update(&self, id: &str, patch: TaskPatch) -> Result<Task, StoreError> {
        self.store.update(id, patch).await
    }

    pub async fn delete(&self, id: &str) -> Result<Task, StoreError> {
        let task = self.store.delete(id).await?;
        info!("Deleted task {}", task.id);
        Ok(task)
    }

    pub async fn move_task(&self, id: &str, status: TaskStatus) -> Result<Task, StoreError> {
        self.update(id, TaskPatch::status(status)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{TimestampIdGenerator, UuidIdGenerator};
    use crate::store::testing::MockAdapter;
    use std::collections::HashSet;

    fn store(adapter: Arc<MockAdapter<Task>>) -> TaskStore<MockAdapter<Task>> {
        TaskStore::new(adapter, Arc::new(UuidIdGenerator))
    }

    #[tokio::test]
    async fn test_add_without_directory() {
        let adapter = Arc::new(MockAdapter::without_target());
        let tasks = store(adapter.clone());

        let task = tasks.add("Buy milk", "").await.unwrap();

        assert_eq!(task.status, TaskStatus::Todo);
        assert!(!task.id.is_empty());
        assert!(task.id.starts_with("task-"));
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(adapter.save_count(), 0);
        assert_eq!(tasks.tasks(), vec![task]);
    }

    #[tokio::test]
    async fn test_add_then_delete_persists_empty_board() {
        let adapter = Arc::new(MockAdapter::with_target());
        let tasks = store(adapter.clone());

        let task = tasks.add("A", "").await.unwrap();
        tasks.delete(&task.id).await.unwrap();

        let saves = adapter.saves();
        assert_eq!(saves.len(), 2);
        assert_eq!(saves[0].entities.len(), 1);
        assert!(saves[1].entities.is_empty());
        assert!(saves[1].last_modified >= saves[0].last_modified);
        assert!(tasks.tasks().is_empty());

        assert_eq!(tasks.load().await, 0);
        let reopened = store(adapter.clone());
        assert_eq!(reopened.load().await, 0);
        assert!(reopened.tasks().is_empty());
    }

    #[tokio::test]
    async fn test_add_with_status_saves_once() {
        let adapter = Arc::new(MockAdapter::with_target());
        let tasks = store(adapter.clone());

        let task = tasks
            .add_with_status("Review PR", "", TaskStatus::InProgress)
            .await
            .unwrap();

        assert_eq!(task.status, TaskStatus::InProgress);
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(adapter.save_count(), 1);
        assert_eq!(adapter.last_saved().unwrap(), vec![task.clone()]);
        assert_eq!(tasks.by_status(TaskStatus::InProgress), vec![task]);
        assert!(tasks.by_status(TaskStatus::Todo).is_empty());
    }

    #[tokio::test]
    async fn test_new_tasks_are_appended() {
        let adapter = Arc::new(MockAdapter::without_target());
        let tasks = store(adapter);

        tasks.add("first", "").await.unwrap();
        tasks.add("second", "").await.unwrap();

        let titles: Vec<String> = tasks.tasks().into_iter().map(|t| t.title).collect();
        assert_eq!(titles, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_move_task_changes_column() {
        let adapter = Arc::new(MockAdapter::with_target());
        let tasks = store(adapter.clone());
        let task = tasks.add("A", "").await.unwrap();

        let moved = tasks.move_task(&task.id, TaskStatus::InProgress).await.unwrap();

        assert_eq!(moved.status, TaskStatus::InProgress);
        assert!(moved.updated_at >= moved.created_at);
        assert!(tasks.by_status(TaskStatus::Todo).is_empty());
        assert_eq!(tasks.by_status(TaskStatus::InProgress), vec![moved]);
    }

    #[tokio::test]
    async fn test_failed_add_reports_rollback() {
        let adapter = Arc::new(MockAdapter::with_target());
        adapter.fail_next(1);
        let tasks = store(adapter.clone());

        let err = tasks.add("A", "").await.unwrap_err();

        assert!(err.is_rollback());
        assert!(tasks.tasks().is_empty());
        assert_eq!(adapter.save_count(), 1);
        assert_eq!(adapter.last_saved().unwrap()[0].title, "A");
    }

    #[tokio::test]
    async fn test_fallback_ids_stay_unique() {
        let adapter = Arc::new(MockAdapter::without_target());
        let tasks = TaskStore::new(adapter, Arc::new(TimestampIdGenerator));

        for i in 0..500 {
            tasks.add(&format!("t{}", i), "").await.unwrap();
        }

        let ids: HashSet<String> = tasks.tasks().into_iter().map(|t| t.id).collect();
        assert_eq!(ids.len(), 500);
    }
}
