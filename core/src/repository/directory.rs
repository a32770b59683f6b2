use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use log::{debug, info, warn};

use crate::model::Entity;
use crate::repository::document::Document;
use crate::repository::traits::{DocumentAdapter, TargetSelector};

/// Stores each entity kind as one JSON file inside a selected directory.
#[derive(Debug, Default)]
pub struct DirectoryAdapter {
    target: RwLock<Option<PathBuf>>,
}

impl DirectoryAdapter {
    /// Restores a previously selected directory. A directory that no longer
    /// exists is dropped so the user is asked again.
    pub fn new(target: Option<PathBuf>) -> Self {
        let target = target.filter(|dir| {
            let usable = dir.is_dir();
            if !usable {
                warn!("Remembered directory {} is gone, ignoring it", dir.display());
            }
            usable
        });
        Self {
            target: RwLock::new(target),
        }
    }

    fn document_path(&self, file_name: &str) -> Option<PathBuf> {
        self.target_dir().map(|dir| dir.join(file_name))
    }
}

#[async_trait]
impl TargetSelector for DirectoryAdapter {
    async fn select_target(&self, dir: &Path) -> Result<bool> {
        match tokio::fs::metadata(dir).await {
            Ok(meta) if !meta.is_dir() => {
                warn!("{} is not a directory", dir.display());
                return Ok(false);
            }
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tokio::fs::create_dir_all(dir)
                    .await
                    .with_context(|| format!("Failed to create {}", dir.display()))?;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to inspect {}", dir.display()));
            }
        }

        let dir = tokio::fs::canonicalize(dir)
            .await
            .with_context(|| format!("Failed to resolve {}", dir.display()))?;
        info!("Selected data directory {}", dir.display());
        *self.target.write().unwrap_or_else(PoisonError::into_inner) = Some(dir);
        Ok(true)
    }

    fn target_name(&self) -> Option<String> {
        self.target_dir().map(|dir| {
            dir.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| dir.display().to_string())
        })
    }

    fn target_dir(&self) -> Option<PathBuf> {
        self.target
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl<E: Entity> DocumentAdapter<E> for DirectoryAdapter {
    fn has_target(&self) -> bool {
        self.target
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    async fn load(&self) -> Result<Option<Document<E>>> {
        let Some(path) = self.document_path(E::FILE_NAME) else {
            return Ok(None);
        };

        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} does not exist yet", path.display());
                return Ok(None);
            }
            Err(e) => return Err(e).with_context(|| format!("Failed to read {}", path.display())),
        };

        let document = Document::from_json(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(Some(document))
    }

    async fn save(&self, document: &Document<E>) -> Result<()> {
        let path = self
            .document_path(E::FILE_NAME)
            .ok_or_else(|| anyhow!("No data directory selected"))?;
        let content = document.to_json()?;
        tokio::fs::write(&path, content)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(
            "Saved {} {} entries to {}",
            document.entities.len(),
            E::KIND,
            path.display()
        );
        Ok(())
    }
}
