//! Content location and fetch settings

use crate::validation::{ConfigSection, ValidationError, Validator};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Where content is loaded from and how it is fetched
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ContentConfig {
    /// `http(s)://` base URL or a local directory holding `manifest.json`
    pub location: String,

    /// Per-request timeout for HTTP locations
    pub request_timeout_secs: u64,

    pub user_agent: String,

    pub max_redirects: usize,
}

impl ContentConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            location: "content".to_string(),
            request_timeout_secs: 30,
            user_agent: format!("Chronicle/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
        }
    }
}

impl ConfigSection for ContentConfig {
    fn validate(&self) -> Result<(), Vec<ValidationError>> {
        Validator::collect_errors(vec![
            Validator::not_empty(&self.location, "content.location"),
            Validator::in_range(
                self.request_timeout_secs,
                1,
                300,
                "content.request_timeout_secs",
            ),
            Validator::not_empty(&self.user_agent, "content.user_agent"),
            Validator::in_range(self.max_redirects, 0, 20, "content.max_redirects"),
        ])
    }

    fn merge(&mut self, other: Self) {
        self.location = other.location;
        self.request_timeout_secs = other.request_timeout_secs;
        self.user_agent = other.user_agent;
        self.max_redirects = other.max_redirects;
    }

    fn section_name(&self) -> &'static str {
        "content"
    }
}
