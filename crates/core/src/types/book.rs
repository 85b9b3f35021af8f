//! Book and chapter content records

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// One volume of the series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub title: String,
    /// Position in the series, starting at 1
    pub book_number: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publish_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u64>,
    #[serde(default)]
    pub genre: Vec<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
    /// Chapter identifiers in reading order
    #[serde(default)]
    pub chapters: Vec<String>,
}

impl Book {
    /// Creates a book with the required fields only
    pub fn new(id: impl Into<String>, title: impl Into<String>, book_number: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            book_number,
            subtitle: None,
            description: String::new(),
            publish_date: None,
            isbn: None,
            pages: None,
            word_count: None,
            genre: Vec::new(),
            themes: Vec::new(),
            cover_image_url: None,
            chapters: Vec::new(),
        }
    }

    /// Adds chapter identifiers in reading order
    pub fn with_chapters<I, S>(mut self, chapters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.chapters.extend(chapters.into_iter().map(Into::into));
        self
    }

    /// Number of chapters this book lists
    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }
}

/// Sorts books ascending by their series position
pub fn sort_books(books: &mut [Book]) {
    books.sort_by_key(|book| book.book_number);
}

/// A single chapter of a book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub id: String,
    pub title: String,
    /// Empty when the source omits it
    #[serde(default)]
    pub description: String,
    /// Ordinal of the owning book
    pub book_number: u32,
    /// Ordinal within the owning book
    pub chapter_number: u32,
    /// Display duration such as "15:45"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default)]
    pub themes: Vec<String>,
    #[serde(default)]
    pub key_characters: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reading_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u64>,
}

impl Chapter {
    /// Creates a chapter with the required fields only
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        book_number: u32,
        chapter_number: u32,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            book_number,
            chapter_number,
            duration: None,
            audio_url: None,
            full_text: None,
            summary: None,
            themes: Vec::new(),
            key_characters: Vec::new(),
            reading_time: None,
            word_count: None,
        }
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Reading-order comparison: book first, then chapter
    pub fn reading_order(&self, other: &Self) -> Ordering {
        self.book_number
            .cmp(&other.book_number)
            .then(self.chapter_number.cmp(&other.chapter_number))
    }

    /// Returns true if an audio rendition is available
    pub fn has_audio(&self) -> bool {
        self.audio_url.as_deref().is_some_and(|url| !url.is_empty())
    }
}

/// Sorts chapters by (book number, chapter number)
///
/// The sort is stable, so chapters sharing a position keep their fetch order.
pub fn sort_chapters(chapters: &mut [Chapter]) {
    chapters.sort_by(Chapter::reading_order);
}
