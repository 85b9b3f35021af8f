//! Transports that fetch raw resource bodies from a content location

use crate::error::{LoaderError, LoaderResult, TransportError};
use async_trait::async_trait;
use bytes::Bytes;
use chronicle_network::{join_url, parse_url, Client, ClientConfig, Url};
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

/// Source of raw resource bodies, addressed by path relative to a content
/// root
#[async_trait]
pub trait ContentTransport: Send + Sync {
    /// Fetches the body of the resource at `path`
    async fn fetch(&self, path: &str) -> Result<Bytes, TransportError>;

    /// Human-readable description of the content root
    fn location(&self) -> String;
}

/// Fetches resources with HTTP GET against a base URL
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: Url,
    client: Client,
}

impl HttpTransport {
    /// Creates a transport rooted at `base_url`
    pub fn new(base_url: &str, client: Client) -> LoaderResult<Self> {
        let base_url =
            parse_url(base_url).map_err(|e| LoaderError::InvalidLocation(e.to_string()))?;

        if !matches!(base_url.scheme(), "http" | "https") {
            return Err(LoaderError::InvalidLocation(format!(
                "unsupported scheme '{}'",
                base_url.scheme()
            )));
        }

        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl ContentTransport for HttpTransport {
    async fn fetch(&self, path: &str) -> Result<Bytes, TransportError> {
        contained(path)?;
        let url = join_url(&self.base_url, path)?;
        Ok(self.client.get_bytes(url.as_str()).await?)
    }

    fn location(&self) -> String {
        self.base_url.to_string()
    }
}

/// Reads resources from a local content directory
#[derive(Debug, Clone)]
pub struct DirectoryTransport {
    root: PathBuf,
}

impl DirectoryTransport {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves `path` under the root, refusing anything that escapes it
    fn resolve(&self, path: &str) -> Result<PathBuf, TransportError> {
        Ok(self.root.join(contained(path)?))
    }
}

/// Checks that `path` stays inside the content root: no root, drive prefix
/// or `..` component, and no percent-encoded dot segment a URL join would
/// resolve
fn contained(path: &str) -> Result<&Path, TransportError> {
    let relative = Path::new(path);
    let escapes = relative
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        || path.split(['/', '\\']).any(is_dot_segment);

    if escapes {
        return Err(TransportError::InvalidPath(path.to_string()));
    }
    Ok(relative)
}

fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    decoded == ".."
}

#[async_trait]
impl ContentTransport for DirectoryTransport {
    async fn fetch(&self, path: &str) -> Result<Bytes, TransportError> {
        let full_path = self.resolve(path)?;
        match tokio::fs::read(&full_path).await {
            Ok(data) => Ok(Bytes::from(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(TransportError::NotFound(path.to_string()))
            }
            Err(e) => Err(TransportError::Io(e)),
        }
    }

    fn location(&self) -> String {
        self.root.display().to_string()
    }
}

/// Returns true if `location` names an HTTP(S) base URL rather than a
/// directory
pub fn is_remote_location(location: &str) -> bool {
    let lower = location.trim().to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Picks a transport for a configured content location
///
/// `http://` and `https://` locations go through [`HttpTransport`]; anything
/// else is treated as a local directory.
pub fn transport_for_location(
    location: &str,
    client_config: ClientConfig,
) -> LoaderResult<Arc<dyn ContentTransport>> {
    let location = location.trim();
    if location.is_empty() {
        return Err(LoaderError::InvalidLocation(
            "location must not be empty".to_string(),
        ));
    }

    if is_remote_location(location) {
        let client = Client::with_config(client_config)
            .map_err(|e| LoaderError::InvalidLocation(e.to_string()))?;
        Ok(Arc::new(HttpTransport::new(location, client)?))
    } else {
        Ok(Arc::new(DirectoryTransport::new(location)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_remote_location_detection() {
        assert!(is_remote_location("https://cdn.example.com/content"));
        assert!(is_remote_location("HTTP://localhost:8080"));
        assert!(!is_remote_location("./content"));
        assert!(!is_remote_location("/var/lib/chronicle/content"));
    }

    #[test]
    fn test_http_transport_rejects_other_schemes() {
        let client = Client::new().expect("client");
        let result = HttpTransport::new("ftp://example.com/content", client);
        assert!(matches!(result, Err(LoaderError::InvalidLocation(_))));
    }

    #[test]
    fn test_empty_location_rejected() {
        let result = transport_for_location("  ", ClientConfig::default());
        assert!(matches!(result, Err(LoaderError::InvalidLocation(_))));
    }

    #[test]
    fn test_transport_for_location_describes_root() {
        let transport =
            transport_for_location("https://example.com/content", ClientConfig::default())
                .expect("http transport");
        assert_eq!(transport.location(), "https://example.com/content");

        let transport =
            transport_for_location("content", ClientConfig::default()).expect("dir transport");
        assert_eq!(transport.location(), "content");
    }

    #[tokio::test]
    async fn test_directory_transport_reads_files() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("books")).unwrap();
        std::fs::write(dir.path().join("books/book1.json"), b"{}").unwrap();

        let transport = DirectoryTransport::new(dir.path());
        let body = transport.fetch("books/book1.json").await.unwrap();
        assert_eq!(&body[..], b"{}");
    }

    #[tokio::test]
    async fn test_directory_transport_missing_file() {
        let dir = TempDir::new().unwrap();
        let transport = DirectoryTransport::new(dir.path());

        let err = transport.fetch("chapters/b1c9.json").await.unwrap_err();
        assert!(matches!(err, TransportError::NotFound(_)));
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_http_transport_refuses_escape() {
        // Nothing listens here; a refused path must fail before any request
        let client = Client::new().expect("client");
        let transport = HttpTransport::new("http://127.0.0.1:9/content", client).unwrap();

        for path in [
            "chapters/../../private/keys.json",
            "../secret.json",
            "/etc/passwd",
            "chapters/%2e%2e/%2E%2E/private/keys.json",
            "chapters/.%2e/keys.json",
            "chapters\\..\\..\\keys.json",
        ] {
            let err = transport.fetch(path).await.unwrap_err();
            assert!(
                matches!(err, TransportError::InvalidPath(ref p) if p == path),
                "{}: {:?}",
                path,
                err
            );
        }
    }

    #[test]
    fn test_contained_accepts_resource_paths() {
        assert!(contained("chapters/b1c1.json").is_ok());
        assert!(contained("./books/book1.json").is_ok());
        assert!(contained("metadata/series..v2.json").is_ok());
        assert!(contained("chapters/../b1c1.json").is_err());
    }

    #[tokio::test]
    async fn test_directory_transport_refuses_escape() {
        let dir = TempDir::new().unwrap();
        let transport = DirectoryTransport::new(dir.path());

        let err = transport.fetch("../secret.json").await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidPath(_)));
        let err = transport.fetch("/etc/passwd").await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidPath(_)));
    }
}
