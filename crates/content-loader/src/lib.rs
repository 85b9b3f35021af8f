// crates/content-loader/src/lib.rs
//! Content loading for the Chronicle series
//!
//! A [`ContentLoader`] reads `manifest.json` from a content location (an
//! HTTP(S) base URL or a local directory), follows it to every book, chapter,
//! character, deleted scene and the series metadata, and returns them as one
//! [`chronicle_core::ContentBundle`].
//!
//! ```rust,no_run
//! use chronicle_loader::ContentLoader;
//! use chronicle_network::ClientConfig;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let loader = ContentLoader::from_location("https://cdn.example.com/content", ClientConfig::default())?;
//! let _subscription = loader.on_loading_state_change(|state| {
//!     println!("{:>3}% {}", state.percentage(), state.current_item);
//! });
//!
//! let bundle = loader.load_all_content().await?;
//! let report = chronicle_loader::validate_bundle(&bundle);
//! println!("{} chapters, valid: {}", bundle.chapters.len(), report.is_valid);
//! # Ok(())
//! # }
//! ```

mod batch;
mod cache;
mod error;
mod loader;
mod state;
mod transport;
mod validation;

pub use batch::Batch;
pub use cache::ResourceCache;
pub use error::{LoaderError, LoaderResult, TransportError};
pub use loader::ContentLoader;
pub use state::{StateCallback, Subscription};
pub use transport::{
    is_remote_location, transport_for_location, ContentTransport, DirectoryTransport,
    HttpTransport,
};
pub use validation::{validate_bundle, validate_content};
