//! Deleted scenes

use serde::{Deserialize, Serialize};

/// A scene cut from the published text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletedScene {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    /// Title or id of the chapter the scene was cut from
    #[serde(default)]
    pub chapter_related: String,
    #[serde(default)]
    pub book_number: u32,
    #[serde(default)]
    pub is_premium: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<u64>,
    /// Why the scene was cut
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default)]
    pub alternate_version: bool,
}

impl DeletedScene {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            content: String::new(),
            chapter_related: String::new(),
            book_number: 0,
            is_premium: false,
            word_count: None,
            reason: None,
            alternate_version: false,
        }
    }

    /// Marks the scene as premium-only
    pub fn premium(mut self) -> Self {
        self.is_premium = true;
        self
    }
}
