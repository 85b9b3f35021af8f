//! The fully resolved content set

use crate::types::{Book, Chapter, Character, DeletedScene, Metadata, SkippedResource};
use serde::{Deserialize, Serialize};

/// Every loaded record, in deterministic order
///
/// Books are ordered by book number and chapters by (book number, chapter
/// number). `skipped` lists the tolerated failures hit while building it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentBundle {
    pub books: Vec<Book>,
    pub chapters: Vec<Chapter>,
    pub characters: Vec<Character>,
    pub deleted_scenes: Vec<DeletedScene>,
    pub metadata: Metadata,
    #[serde(default)]
    pub skipped: Vec<SkippedResource>,
}

impl ContentBundle {
    /// Looks up a book by its series position
    pub fn book(&self, book_number: u32) -> Option<&Book> {
        self.books.iter().find(|b| b.book_number == book_number)
    }

    /// Chapters of one book, in reading order
    pub fn chapters_for_book(&self, book_number: u32) -> impl Iterator<Item = &Chapter> {
        self.chapters
            .iter()
            .filter(move |c| c.book_number == book_number)
    }

    pub fn chapter(&self, id: &str) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.id == id)
    }

    pub fn character(&self, id: &str) -> Option<&Character> {
        self.characters.iter().find(|c| c.id == id)
    }

    /// Relationship edges whose target is not a loaded character
    pub fn dangling_relationships(&self) -> Vec<(&str, &str)> {
        self.characters
            .iter()
            .flat_map(|c| c.related_ids().map(move |target| (c.id.as_str(), target)))
            .filter(|(_, target)| self.character(target).is_none())
            .collect()
    }

    /// Returns true if any tolerated failure occurred
    pub fn is_partial(&self) -> bool {
        !self.skipped.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Relationship, ResourceKind};

    fn sample() -> ContentBundle {
        ContentBundle {
            books: vec![Book::new("book-1", "One", 1), Book::new("book-2", "Two", 2)],
            chapters: vec![
                Chapter::new("b1c1", "A", 1, 1),
                Chapter::new("b1c2", "B", 1, 2),
                Chapter::new("b2c1", "C", 2, 1),
            ],
            characters: vec![
                Character::new("kael", "Kael").with_relationship(Relationship::new("lyra", "bond")),
                Character::new("lyra", "Lyra").with_relationship(Relationship::new("astrael", "foe")),
            ],
            deleted_scenes: vec![DeletedScene::new("ds1", "Bridge")],
            metadata: Metadata::default(),
            skipped: Vec::new(),
        }
    }

    #[test]
    fn test_lookups() {
        let bundle = sample();
        assert_eq!(bundle.book(2).map(|b| b.id.as_str()), Some("book-2"));
        assert!(bundle.book(3).is_none());
        assert_eq!(bundle.chapters_for_book(1).count(), 2);
        assert_eq!(bundle.chapter("b2c1").map(|c| c.book_number), Some(2));
        assert!(bundle.character("maya").is_none());
    }

    #[test]
    fn test_dangling_relationships() {
        let bundle = sample();
        assert_eq!(bundle.dangling_relationships(), vec![("lyra", "astrael")]);
    }

    #[test]
    fn test_partial_bundle() {
        let mut bundle = sample();
        assert!(!bundle.is_partial());
        bundle.skipped.push(SkippedResource::new(
            ResourceKind::Chapter,
            "chapters/b1c3.json",
            "HTTP 404",
        ));
        assert!(bundle.is_partial());
    }
}
