pub mod note;
pub mod task;

use std::fmt::Debug;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;

pub use note::{Note, NotePatch, TagSet};
pub use task::{Task, TaskPatch, TaskStatus};

/// Where a newly created entity lands in its collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Append,
    Prepend,
}

/// An entity kind held by an `EntityStore` and persisted as one document.
pub trait Entity:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Partial update merged by `apply`.
    type Patch: Send;

    /// Id prefix and log label, e.g. `task`.
    const KIND: &'static str;
    /// Key of the entity list inside the persisted document.
    const COLLECTION: &'static str;
    /// File name of the persisted document inside the target directory.
    const FILE_NAME: &'static str;
    const PLACEMENT: Placement;

    fn id(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn updated_at(&self) -> DateTime<Utc>;

    /// Merges `patch` and refreshes `updated_at` to `now`.
    fn apply(&mut self, patch: Self::Patch, now: DateTime<Utc>);
}
