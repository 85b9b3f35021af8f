// Shared fixtures for loader integration tests
#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use chronicle_loader::{ContentTransport, TransportError};
use serde_json::{json, Value};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// In-memory transport that counts fetches per path
#[derive(Default)]
pub struct MockTransport {
    bodies: Mutex<HashMap<String, Bytes>>,
    failing: Mutex<HashSet<String>>,
    fetches: Mutex<HashMap<String, usize>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_json(&self, path: &str, value: Value) {
        self.insert_raw(path, value.to_string().into_bytes());
    }

    pub fn insert_raw(&self, path: &str, body: impl Into<Bytes>) {
        self.bodies
            .lock()
            .unwrap()
            .insert(path.to_string(), body.into());
    }

    /// Makes every fetch of `path` fail with an I/O error
    pub fn fail(&self, path: &str) {
        self.failing.lock().unwrap().insert(path.to_string());
    }

    pub fn fetch_count(&self, path: &str) -> usize {
        self.fetches.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().unwrap().values().sum()
    }

    pub fn fetched_paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self.fetches.lock().unwrap().keys().cloned().collect();
        paths.sort();
        paths
    }
}

#[async_trait]
impl ContentTransport for MockTransport {
    async fn fetch(&self, path: &str) -> Result<Bytes, TransportError> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_insert(0) += 1;

        tokio::task::yield_now().await;

        if self.failing.lock().unwrap().contains(path) {
            return Err(TransportError::Io(std::io::Error::other(format!(
                "connection reset while reading {}",
                path
            ))));
        }

        self.bodies
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| TransportError::NotFound(path.to_string()))
    }

    fn location(&self) -> String {
        "memory://content".to_string()
    }
}

/// Routes loader logs to the test output
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn manifest() -> Value {
    json!({
        "version": "1.0.0",
        "lastUpdated": "2024-03-01",
        "books": ["book2.json", "book1.json"],
        "characters": ["kael.json", "lyra.json", "voss.json"],
        "deletedScenes": ["ds1.json", "ds2.json"],
        "metadata": "series.json",
        "assets": {"audio": ["audio/b1c1.mp3"]}
    })
}

pub fn book(number: u32, chapters: &[&str]) -> Value {
    json!({
        "id": format!("book-{}", number),
        "title": format!("Book {}", number),
        "bookNumber": number,
        "publishDate": "2023-01-01",
        "chapters": chapters,
    })
}

pub fn chapter(id: &str, book_number: u32, chapter_number: u32) -> Value {
    json!({
        "id": id,
        "title": format!("Chapter {}", id),
        "bookNumber": book_number,
        "chapterNumber": chapter_number,
        "description": "A chapter",
        "wordCount": 3200,
        "readingTime": "14 min"
    })
}

pub fn character(id: &str, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "role": "protagonist",
        "description": "",
        "relationships": [{"characterId": "lyra", "type": "ally", "description": "Trusted"}]
    })
}

pub fn scene(id: &str, premium: bool) -> Value {
    json!({
        "id": id,
        "title": format!("Scene {}", id),
        "chapterRelated": "b1c2",
        "bookNumber": 1,
        "isPremium": premium
    })
}

/// A complete content tree: two books (listed out of order), four chapters
/// (listed out of chapter order), three characters, two scenes and metadata
pub fn populated() -> MockTransport {
    let transport = MockTransport::new();
    transport.insert_json("manifest.json", manifest());
    transport.insert_json("books/book1.json", book(1, &["b1c2", "b1c1"]));
    transport.insert_json("books/book2.json", book(2, &["b2c1", "b2c2"]));
    transport.insert_json("chapters/b1c1.json", chapter("b1c1", 1, 1));
    transport.insert_json("chapters/b1c2.json", chapter("b1c2", 1, 2));
    transport.insert_json("chapters/b2c1.json", chapter("b2c1", 2, 1));
    transport.insert_json("chapters/b2c2.json", chapter("b2c2", 2, 2));
    transport.insert_json("characters/kael.json", character("kael", "Kael"));
    transport.insert_json("characters/lyra.json", character("lyra", "Lyra"));
    transport.insert_json("characters/voss.json", character("voss", "Voss"));
    transport.insert_json("scenes/ds1.json", scene("ds1", false));
    transport.insert_json("scenes/ds2.json", scene("ds2", true));
    transport.insert_json(
        "metadata/series.json",
        json!({
            "series": {
                "title": "The Chronicle",
                "totalBooks": 2,
                "author": {"name": "A. Writer"}
            },
            "production": {"version": "1.0.0"}
        }),
    );
    transport
}

/// Number of distinct resources in [`populated`]
pub const POPULATED_RESOURCES: usize = 13;
