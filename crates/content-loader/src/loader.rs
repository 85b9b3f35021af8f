//! Manifest-driven content loader

use crate::batch::Batch;
use crate::cache::ResourceCache;
use crate::error::{LoaderError, LoaderResult};
use crate::state::{fraction, Stage, StateCallback, StateTracker, Subscription};
use crate::transport::{transport_for_location, ContentTransport, DirectoryTransport, HttpTransport};
use crate::validation::validate_content;
use chronicle_core::{
    sort_books, sort_chapters, Book, Chapter, Character, ContentBundle, ContentValidation,
    DeletedScene, LoadingState, Manifest, Metadata, ResourceKind, SkippedResource,
};
use chronicle_network::{Client, ClientConfig};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashSet;
use std::future::Future;
use std::path::PathBuf;
use std::sync::Arc;

/// Loads the manifest and every resource it references
///
/// Each list is fetched one resource at a time. [`ContentLoader::load_all_content`]
/// runs the five top-level loads concurrently on the calling task. Fetched
/// bodies are cached by path until [`ContentLoader::clear_cache`].
///
/// Manifest, book and metadata failures are fatal. Chapter, character and
/// deleted-scene failures are logged, recorded as skipped, and the rest of the
/// list still loads.
pub struct ContentLoader {
    transport: Arc<dyn ContentTransport>,
    cache: ResourceCache,
    state: StateTracker,
}

impl ContentLoader {
    /// Creates a loader over any transport
    pub fn new(transport: impl ContentTransport + 'static) -> Self {
        Self::with_transport(Arc::new(transport))
    }

    /// Creates a loader over a shared transport
    pub fn with_transport(transport: Arc<dyn ContentTransport>) -> Self {
        Self {
            transport,
            cache: ResourceCache::new(),
            state: StateTracker::new(),
        }
    }

    /// Creates a loader fetching from an HTTP(S) base URL
    pub fn http(base_url: &str, client: Client) -> LoaderResult<Self> {
        Ok(Self::new(HttpTransport::new(base_url, client)?))
    }

    /// Creates a loader reading from a local content directory
    pub fn directory(root: impl Into<PathBuf>) -> Self {
        Self::new(DirectoryTransport::new(root))
    }

    /// Creates a loader for a URL or directory location
    pub fn from_location(location: &str, client_config: ClientConfig) -> LoaderResult<Self> {
        Ok(Self::with_transport(transport_for_location(
            location,
            client_config,
        )?))
    }

    /// Description of the content root
    pub fn location(&self) -> String {
        self.transport.location()
    }

    /// Fetches and parses the manifest
    pub async fn load_manifest(&self) -> LoaderResult<Manifest> {
        self.standalone(ResourceKind::MANIFEST_PATH, self.manifest())
            .await
    }

    /// Fetches every book listed in the manifest, sorted by book number
    pub async fn load_books(&self) -> LoaderResult<Vec<Book>> {
        self.standalone("books", self.books()).await
    }

    /// Fetches every chapter of every book, in reading order
    pub async fn load_all_chapters(&self) -> LoaderResult<Batch<Chapter>> {
        self.standalone("chapters", self.chapters()).await
    }

    /// Fetches every character listed in the manifest
    pub async fn load_characters(&self) -> LoaderResult<Batch<Character>> {
        self.standalone("characters", self.characters()).await
    }

    /// Fetches every deleted scene listed in the manifest
    pub async fn load_deleted_scenes(&self) -> LoaderResult<Batch<DeletedScene>> {
        self.standalone("deleted scenes", self.deleted_scenes())
            .await
    }

    /// Fetches the series metadata
    pub async fn load_metadata(&self) -> LoaderResult<Metadata> {
        self.standalone("metadata", self.metadata()).await
    }

    /// Loads the complete content bundle
    ///
    /// On failure the loading state records the error with progress reset to
    /// 0 and the error is returned; no partial bundle is produced.
    pub async fn load_all_content(&self) -> LoaderResult<ContentBundle> {
        self.state.begin_combined("Starting content load...");
        log::info!("Loading content from {}", self.transport.location());

        let result = tokio::try_join!(
            self.books(),
            self.chapters(),
            self.characters(),
            self.deleted_scenes(),
            self.metadata(),
        );

        match result {
            Ok((books, chapters, characters, deleted_scenes, metadata)) => {
                let mut skipped = chapters.skipped;
                skipped.extend(characters.skipped);
                skipped.extend(deleted_scenes.skipped);

                let bundle = ContentBundle {
                    books,
                    chapters: chapters.items,
                    characters: characters.items,
                    deleted_scenes: deleted_scenes.items,
                    metadata,
                    skipped,
                };

                self.state.complete("Content loaded successfully");
                log::info!(
                    "Loaded {} books, {} chapters, {} characters, {} deleted scenes ({} skipped)",
                    bundle.books.len(),
                    bundle.chapters.len(),
                    bundle.characters.len(),
                    bundle.deleted_scenes.len(),
                    bundle.skipped.len()
                );
                Ok(bundle)
            }
            Err(e) => {
                let message = format!("Failed to load content: {}", e);
                log::error!("{}", message);
                self.state.fail(message);
                Err(e)
            }
        }
    }

    /// Clears the cache, then loads everything again
    pub async fn refresh_content(&self) -> LoaderResult<ContentBundle> {
        self.clear_cache();
        self.load_all_content().await
    }

    /// Discards every cached resource body
    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    /// Paths currently cached, sorted
    pub fn cached_paths(&self) -> Vec<String> {
        self.cache.paths()
    }

    /// Checks the structure of a bundle in its JSON form
    pub fn validate_content(&self, bundle: &Value) -> ContentValidation {
        validate_content(bundle)
    }

    /// Copy of the current loading state
    pub fn loading_state(&self) -> LoadingState {
        self.state.snapshot()
    }

    /// Registers an observer called after every loading-state change
    pub fn on_loading_state_change<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&LoadingState) + Send + Sync + 'static,
    {
        let callback: StateCallback = Arc::new(callback);
        self.state.subscribe(callback)
    }

    /// Runs one public operation, giving it its own load cycle unless a
    /// cycle is already running
    async fn standalone<T>(
        &self,
        label: &str,
        operation: impl Future<Output = LoaderResult<T>>,
    ) -> LoaderResult<T> {
        let owns_cycle = self.state.begin_if_idle(label);
        let result = operation.await;

        if owns_cycle {
            match &result {
                Ok(_) => self.state.finish(),
                Err(e) => self.state.abort(e.to_string()),
            }
        }

        result
    }

    async fn manifest(&self) -> LoaderResult<Manifest> {
        let path = ResourceKind::Manifest.resolve("");
        self.state.advance(Stage::Manifest, &path, 0.0);

        let manifest = self
            .fetch::<Manifest>(&path)
            .await
            .map_err(|e| LoaderError::Manifest(Box::new(e)))?;

        self.state.checkpoint(Stage::Manifest, 1.0);
        Ok(manifest)
    }

    async fn books(&self) -> LoaderResult<Vec<Book>> {
        self.state.advance(Stage::Books, "books", 0.0);
        let manifest = self.manifest().await?;

        let total = manifest.books.len();
        let mut books = Vec::with_capacity(total);

        for (index, file) in manifest.books.iter().enumerate() {
            let path = ResourceKind::Book.resolve(file);
            self.state.advance(Stage::Books, &path, fraction(index, total));

            let book = self
                .fetch::<Book>(&path)
                .await
                .map_err(|e| LoaderError::Books(Box::new(e)))?;
            books.push(book);
        }

        self.state.checkpoint(Stage::Books, 1.0);
        sort_books(&mut books);
        Ok(books)
    }

    async fn chapters(&self) -> LoaderResult<Batch<Chapter>> {
        self.state.advance(Stage::Chapters, "chapters", 0.0);
        let books = self.books().await?;

        let ids: Vec<String> = books
            .iter()
            .flat_map(|book| book.chapters.iter().cloned())
            .collect();

        let mut seen = HashSet::new();
        for id in &ids {
            if !seen.insert(id.as_str()) {
                log::warn!("Chapter {} is listed more than once", id);
            }
        }

        // Progress counts chapters across all books, so books of different
        // lengths still fill the range evenly
        let mut batch = self
            .fetch_batch::<Chapter>(ResourceKind::Chapter, &ids, Stage::Chapters)
            .await;
        sort_chapters(&mut batch.items);
        Ok(batch)
    }

    async fn characters(&self) -> LoaderResult<Batch<Character>> {
        self.state.advance(Stage::Characters, "characters", 0.0);
        let manifest = self.manifest().await?;

        Ok(self
            .fetch_batch(ResourceKind::Character, &manifest.characters, Stage::Characters)
            .await)
    }

    async fn deleted_scenes(&self) -> LoaderResult<Batch<DeletedScene>> {
        self.state.advance(Stage::DeletedScenes, "deleted scenes", 0.0);
        let manifest = self.manifest().await?;

        Ok(self
            .fetch_batch(
                ResourceKind::DeletedScene,
                &manifest.deleted_scenes,
                Stage::DeletedScenes,
            )
            .await)
    }

    async fn metadata(&self) -> LoaderResult<Metadata> {
        self.state.advance(Stage::Metadata, "metadata", 0.0);
        let manifest = self.manifest().await?;

        let path = ResourceKind::Metadata.resolve(&manifest.metadata);
        self.state.advance(Stage::Metadata, &path, 0.0);

        let metadata = self
            .fetch::<Metadata>(&path)
            .await
            .map_err(|e| LoaderError::Metadata(Box::new(e)))?;

        self.state.checkpoint(Stage::Metadata, 1.0);
        Ok(metadata)
    }

    /// Fetches `names` one at a time, skipping the ones that fail
    async fn fetch_batch<T: DeserializeOwned>(
        &self,
        kind: ResourceKind,
        names: &[String],
        stage: Stage,
    ) -> Batch<T> {
        let total = names.len();
        let mut items = Vec::with_capacity(total);
        let mut skipped = Vec::new();

        for (index, name) in names.iter().enumerate() {
            let path = kind.resolve(name);
            self.state.advance(stage, &path, fraction(index, total));

            match self.fetch::<T>(&path).await {
                Ok(item) => items.push(item),
                Err(e) => {
                    log::warn!("Failed to load {} {}: {}", kind, name, e);
                    skipped.push(SkippedResource::new(kind, path, e.to_string()));
                }
            }
        }

        self.state.checkpoint(stage, 1.0);
        Batch::new(items, skipped)
    }

    /// Fetches `path` through the cache and decodes it
    async fn fetch<T: DeserializeOwned>(&self, path: &str) -> LoaderResult<T> {
        let transport = &self.transport;
        let value = self
            .cache
            .get_or_fetch(path, move || async move {
                log::debug!("Fetching {}", path);
                let body = transport
                    .fetch(path)
                    .await
                    .map_err(|source| LoaderError::Fetch {
                        path: path.to_string(),
                        source,
                    })?;

                serde_json::from_slice::<Value>(&body).map_err(|source| LoaderError::Parse {
                    path: path.to_string(),
                    source,
                })
            })
            .await?;

        T::deserialize(value.as_ref()).map_err(|source| LoaderError::Parse {
            path: path.to_string(),
            source,
        })
    }
}

impl std::fmt::Debug for ContentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContentLoader")
            .field("location", &self.transport.location())
            .field("cached", &self.cache.len())
            .finish()
    }
}
