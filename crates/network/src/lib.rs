// crates/network/src/lib.rs
//! Network utilities for fetching content over HTTP

mod client;
mod error;

pub use client::{join_url, parse_url, Client, ClientConfig};
pub use error::{NetworkError, NetworkResult};
pub use reqwest::Url;
