//! Transient loading progress

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Progress record for a content load
///
/// `progress` runs from 0 to 100 and never decreases within one load cycle;
/// only starting a new cycle or a fatal failure resets it to 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingState {
    pub is_loading: bool,
    pub progress: f64,
    /// What is being fetched right now, for display
    pub current_item: String,
    pub error: Option<String>,
    /// When the last full load completed successfully
    pub last_loaded: Option<DateTime<Utc>>,
}

impl LoadingState {
    /// Progress value once a load has completed
    pub const COMPLETE: f64 = 100.0;

    /// Returns true if the last load failed
    pub fn has_failed(&self) -> bool {
        self.error.is_some()
    }

    /// Returns true if a load has finished without error
    pub fn is_complete(&self) -> bool {
        !self.is_loading && self.error.is_none() && self.progress >= Self::COMPLETE
    }

    /// Progress rounded to a whole percentage
    pub fn percentage(&self) -> u8 {
        self.progress.clamp(0.0, Self::COMPLETE).round() as u8
    }
}

impl Default for LoadingState {
    fn default() -> Self {
        Self {
            is_loading: false,
            progress: 0.0,
            current_item: String::new(),
            error: None,
            last_loaded: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_state_is_idle() {
        let state = LoadingState::default();
        assert!(!state.is_loading);
        assert_eq!(state.progress, 0.0);
        assert!(!state.has_failed());
        assert!(!state.is_complete());
    }

    #[test]
    fn test_percentage_rounds_and_clamps() {
        let mut state = LoadingState::default();
        state.progress = 42.6;
        assert_eq!(state.percentage(), 43);
        state.progress = 180.0;
        assert_eq!(state.percentage(), 100);
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(LoadingState::default()).unwrap();
        assert_eq!(value["isLoading"], false);
        assert!(value["lastLoaded"].is_null());
    }
}
