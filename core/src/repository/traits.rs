use std::path::{Path, PathBuf};

use anyhow::Result;
use async_trait::async_trait;

use crate::model::Entity;
use crate::repository::document::Document;

/// Loads and saves the whole document of one entity kind.
///
/// Stores only ever call these three methods; any failure is treated the
/// same regardless of cause.
#[async_trait]
pub trait DocumentAdapter<E: Entity>: Send + Sync {
    /// Whether a persistence target is configured. Without one, stores keep
    /// their changes in memory only.
    fn has_target(&self) -> bool;

    /// Returns `None` when no target is configured or the document does not
    /// exist yet.
    async fn load(&self) -> Result<Option<Document<E>>>;

    async fn save(&self, document: &Document<E>) -> Result<()>;
}

/// Chooses where documents are stored.
#[async_trait]
pub trait TargetSelector: Send + Sync {
    /// Returns whether `dir` was established as the target.
    async fn select_target(&self, dir: &Path) -> Result<bool>;

    fn target_name(&self) -> Option<String>;

    fn target_dir(&self) -> Option<PathBuf>;
}
