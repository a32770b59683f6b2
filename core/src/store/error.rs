use thiserror::Error;

/// Outcome of a store operation that did not take effect.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    /// No entity with this id; nothing changed and nothing was persisted.
    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("{kind} '{id}' already exists")]
    Duplicate { kind: &'static str, id: String },

    /// A user-supplied id prefix matched nothing or more than one entity.
    #[error("{0}")]
    InvalidId(String),

    /// The change was applied, persisting it failed, and the previous
    /// collection has been restored.
    #[error("Failed to save {kind} data, change reverted: {message}")]
    SaveFailed { kind: &'static str, message: String },
}

impl StoreError {
    pub fn not_found(kind: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            id: id.into(),
        }
    }

    pub fn is_rollback(&self) -> bool {
        matches!(self, Self::SaveFailed { .. })
    }
}
