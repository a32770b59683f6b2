pub mod entity_store;
pub mod error;
pub mod note_store;
pub mod task_store;

#[cfg(test)]
pub(crate) mod testing;

pub use entity_store::EntityStore;
pub use error::StoreError;
pub use note_store::NoteStore;
pub use task_store::TaskStore;
