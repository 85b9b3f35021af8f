//! Content manifest: the index of every other resource

use serde::{Deserialize, Serialize};

/// Top-level content index, fetched first to discover everything else
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    /// Content set version (informational)
    #[serde(default)]
    pub version: String,
    /// Last update timestamp as authored (informational)
    #[serde(default)]
    pub last_updated: String,
    /// Book file names, relative to `books/`
    pub books: Vec<String>,
    /// Character file names, relative to `characters/`
    #[serde(default)]
    pub characters: Vec<String>,
    /// Deleted scene file names, relative to `scenes/`
    #[serde(default)]
    pub deleted_scenes: Vec<String>,
    /// Metadata file name, relative to `metadata/`
    pub metadata: String,
    /// Auxiliary media paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assets: Option<ManifestAssets>,
}

impl Manifest {
    /// Total number of resources the manifest references directly
    ///
    /// Chapters are not counted here: they are discovered through books.
    pub fn resource_count(&self) -> usize {
        1 + self.books.len() + self.characters.len() + self.deleted_scenes.len() + 1
    }
}

/// Optional lists of audio, image and video asset paths
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestAssets {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<String>>,
}

impl ManifestAssets {
    /// Iterates over every asset path regardless of media type
    pub fn all_paths(&self) -> impl Iterator<Item = &str> {
        self.audio
            .iter()
            .chain(self.images.iter())
            .chain(self.videos.iter())
            .flatten()
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_from_json() {
        let manifest: Manifest = serde_json::from_str(
            r#"{
                "version": "1.2.0",
                "lastUpdated": "2024-05-01T00:00:00Z",
                "books": ["book1.json", "book2.json"],
                "characters": ["kael.json"],
                "deletedScenes": ["ds1.json"],
                "metadata": "series.json",
                "assets": { "audio": ["audio/b1c1.mp3"], "images": ["img/kael.jpg"] }
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.books, vec!["book1.json", "book2.json"]);
        assert_eq!(manifest.deleted_scenes, vec!["ds1.json"]);
        assert_eq!(manifest.metadata, "series.json");
        assert_eq!(manifest.resource_count(), 6);

        let assets = manifest.assets.unwrap();
        let paths: Vec<&str> = assets.all_paths().collect();
        assert_eq!(paths, vec!["audio/b1c1.mp3", "img/kael.jpg"]);
    }

    #[test]
    fn test_manifest_optional_lists_default_to_empty() {
        let manifest: Manifest =
            serde_json::from_str(r#"{"books": [], "metadata": "m.json"}"#).unwrap();
        assert!(manifest.characters.is_empty());
        assert!(manifest.deleted_scenes.is_empty());
        assert!(manifest.assets.is_none());
    }

    #[test]
    fn test_manifest_requires_books_and_metadata() {
        assert!(serde_json::from_str::<Manifest>(r#"{"metadata": "m.json"}"#).is_err());
        assert!(serde_json::from_str::<Manifest>(r#"{"books": []}"#).is_err());
    }
}
