//! Resource classes and their failure taxonomy

use serde::{Deserialize, Serialize};
use std::fmt;

/// How a failure to load a resource affects the surrounding load
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum FailureSeverity {
    /// Logged and skipped; the batch continues without the item
    Tolerated,
    /// Aborts the whole load
    Fatal,
}

impl fmt::Display for FailureSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tolerated => write!(f, "Tolerated"),
            Self::Fatal => write!(f, "Fatal"),
        }
    }
}

/// Class of a content resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResourceKind {
    Manifest,
    Book,
    Chapter,
    Character,
    DeletedScene,
    Metadata,
}

impl ResourceKind {
    /// Relative path of the manifest
    pub const MANIFEST_PATH: &'static str = "manifest.json";

    /// Directory holding resources of this kind (none for the manifest)
    pub fn directory(&self) -> Option<&'static str> {
        match self {
            Self::Manifest => None,
            Self::Book => Some("books"),
            Self::Chapter => Some("chapters"),
            Self::Character => Some("characters"),
            Self::DeletedScene => Some("scenes"),
            Self::Metadata => Some("metadata"),
        }
    }

    /// Failure tier for this kind of resource
    pub fn severity(&self) -> FailureSeverity {
        match self {
            Self::Manifest | Self::Book | Self::Metadata => FailureSeverity::Fatal,
            Self::Chapter | Self::Character | Self::DeletedScene => FailureSeverity::Tolerated,
        }
    }

    /// Resolves a manifest entry (or chapter id) to a path relative to the
    /// content root
    ///
    /// Chapters are addressed by id and get a `.json` suffix; every other
    /// kind is addressed by its file name as listed.
    pub fn resolve(&self, name: &str) -> String {
        match self {
            Self::Manifest => Self::MANIFEST_PATH.to_string(),
            Self::Chapter => format!("chapters/{}.json", name),
            other => format!("{}/{}", other.directory().unwrap_or_default(), name),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Manifest => write!(f, "manifest"),
            Self::Book => write!(f, "book"),
            Self::Chapter => write!(f, "chapter"),
            Self::Character => write!(f, "character"),
            Self::DeletedScene => write!(f, "deleted scene"),
            Self::Metadata => write!(f, "metadata"),
        }
    }
}

/// A resource that failed to load and was left out of its list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedResource {
    pub kind: ResourceKind,
    /// Path relative to the content root
    pub path: String,
    /// Human-readable failure
    pub reason: String,
}

impl SkippedResource {
    pub fn new(kind: ResourceKind, path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            kind,
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for SkippedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} skipped: {}", self.kind, self.path, self.reason)
    }
}
