//! Content records for Chronicle
//!
//! This module contains the typed records the content pipeline produces:
//! - `manifest`: The content index
//! - `book`: Book and Chapter records
//! - `character`: Character profiles and relationships
//! - `scene`: Deleted scenes
//! - `metadata`: Series and production metadata
//! - `bundle`: The assembled content set
//! - `resource`: Resource classes and the failure taxonomy
//! - `state`: Loading progress
//! - `validation`: Structural validation report

mod book;
mod bundle;
mod character;
mod manifest;
mod metadata;
mod resource;
mod scene;
mod state;
mod validation;

// Re-export all public types
pub use book::{sort_books, sort_chapters, Book, Chapter};
pub use bundle::ContentBundle;
pub use character::{ArcPhase, Character, FirstAppearance, Relationship};
pub use manifest::{Manifest, ManifestAssets};
pub use metadata::{
    Adaptations, AuthorInfo, FilmAdaptation, Metadata, ProductionInfo, SeriesAdaptation,
    SeriesInfo, SocialLinks, Soundtrack, UniverseInfo,
};
pub use resource::{FailureSeverity, ResourceKind, SkippedResource};
pub use scene::DeletedScene;
pub use state::LoadingState;
pub use validation::ContentValidation;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_types_are_exported() {
        let _ = Book::new("b", "T", 1);
        let _ = Chapter::new("c", "T", 1, 1);
        let _ = Character::new("k", "K");
        let _ = DeletedScene::new("d", "T");
        let _ = ContentBundle::default();
        let _ = LoadingState::default();
        let _ = ContentValidation::default();
    }
}
