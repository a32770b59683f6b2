pub mod config;
pub mod editor;
pub mod id;
pub mod input;
pub mod logging;
pub mod model;
pub mod repository;
pub mod store;
pub mod view;
pub mod workspace;

pub use config::{expand_home, AppConfig, ConfigStore};
pub use editor::{is_save_shortcut, NoteDraft, TaskDraft};
pub use id::{IdGenerator, IdStrategy, TimestampIdGenerator, UuidIdGenerator};
pub use input::{expand_key, parse_args, ParsedInput};
pub use model::{Note, NotePatch, TagSet, Task, TaskPatch, TaskStatus};
pub use repository::{DirectoryAdapter, Document, DocumentAdapter, TargetSelector};
pub use store::{EntityStore, NoteStore, StoreError, TaskStore};
pub use view::{Screen, Selection, View};
pub use workspace::Workspace;
