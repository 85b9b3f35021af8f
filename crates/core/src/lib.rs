//! Chronicle core types
//!
//! Plain records for the series content (books, chapters, characters,
//! deleted scenes, metadata), the manifest that indexes them, and the
//! progress and validation records reported by the content loader.

pub mod types;

// Re-export commonly used types
pub use types::{
    sort_books, sort_chapters, ArcPhase, Book, Chapter, Character, ContentBundle,
    ContentValidation, DeletedScene, FailureSeverity, FirstAppearance, LoadingState, Manifest,
    ManifestAssets, Metadata, Relationship, ResourceKind, SkippedResource,
};
