pub mod directory;
pub mod document;
pub mod traits;

// Re-export
pub use directory::DirectoryAdapter;
pub use document::Document;
pub use traits::{DocumentAdapter, TargetSelector};
