//! Error types for content loading

use chronicle_network::NetworkError;
use thiserror::Error;

/// Result type for loader operations
pub type LoaderResult<T> = Result<T, LoaderError>;

/// A transport could not deliver a resource body
#[derive(Debug, Error)]
pub enum TransportError {
    /// HTTP failure, including non-success statuses
    #[error(transparent)]
    Network(#[from] NetworkError),

    /// The resource does not exist at the content location
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Local file system failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Path refused by the transport
    #[error("Invalid resource path: {0}")]
    InvalidPath(String),
}

impl TransportError {
    /// Returns true if the resource is missing rather than unreachable
    pub fn is_not_found(&self) -> bool {
        match self {
            TransportError::NotFound(_) => true,
            TransportError::Network(e) => e.is_not_found(),
            TransportError::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            TransportError::InvalidPath(_) => false,
        }
    }
}

/// Errors returned by the content loader
///
/// Only fatal failures surface here. Tolerated per-item failures are
/// recorded as skipped resources instead.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// Transport failed to deliver a resource
    #[error("Failed to load {path}: {source}")]
    Fetch {
        path: String,
        #[source]
        source: TransportError,
    },

    /// Body was not valid JSON or did not match the expected record shape
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// The manifest could not be loaded
    #[error("Failed to load content manifest: {0}")]
    Manifest(#[source] Box<LoaderError>),

    /// A book could not be loaded
    #[error("Failed to load books: {0}")]
    Books(#[source] Box<LoaderError>),

    /// The metadata could not be loaded
    #[error("Failed to load metadata: {0}")]
    Metadata(#[source] Box<LoaderError>),

    /// The content location could not be used
    #[error("Invalid content location: {0}")]
    InvalidLocation(String),
}

impl LoaderError {
    /// Relative path of the resource at the root of the failure, if any
    pub fn path(&self) -> Option<&str> {
        match self {
            LoaderError::Fetch { path, .. } | LoaderError::Parse { path, .. } => Some(path),
            LoaderError::Manifest(inner)
            | LoaderError::Books(inner)
            | LoaderError::Metadata(inner) => inner.path(),
            LoaderError::InvalidLocation(_) => None,
        }
    }

    /// Returns true if the root failure is a missing resource
    pub fn is_not_found(&self) -> bool {
        match self {
            LoaderError::Fetch { source, .. } => source.is_not_found(),
            LoaderError::Manifest(inner)
            | LoaderError::Books(inner)
            | LoaderError::Metadata(inner) => inner.is_not_found(),
            LoaderError::Parse { .. } | LoaderError::InvalidLocation(_) => false,
        }
    }
}
