//! Loading state tracking and change notification

use chrono::Utc;
use chronicle_core::LoadingState;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Callback invoked with the new state after every change
pub type StateCallback = Arc<dyn Fn(&LoadingState) + Send + Sync>;

#[derive(Default)]
struct Observers {
    next_id: AtomicU64,
    callbacks: Mutex<Vec<(u64, StateCallback)>>,
}

impl Observers {
    fn callbacks(&self) -> MutexGuard<'_, Vec<(u64, StateCallback)>> {
        self.callbacks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn snapshot(&self) -> Vec<StateCallback> {
        self.callbacks()
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect()
    }
}

/// Handle for a registered loading-state observer
///
/// Dropping the handle keeps the observer registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[must_use = "keep the subscription to be able to unsubscribe"]
pub struct Subscription {
    id: u64,
    observers: Weak<Observers>,
}

impl Subscription {
    /// Removes the observer. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        let Some(observers) = self.observers.upgrade() else {
            return false;
        };
        let mut callbacks = observers.callbacks();
        let before = callbacks.len();
        callbacks.retain(|(id, _)| *id != self.id);
        callbacks.len() != before
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

/// Phases of a load, each owning a slice of the progress bar
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Stage {
    Manifest,
    Books,
    Chapters,
    Characters,
    DeletedScenes,
    Metadata,
}

impl Stage {
    const COUNT: usize = 6;
    const ALL: [Stage; Stage::COUNT] = [
        Stage::Manifest,
        Stage::Books,
        Stage::Chapters,
        Stage::Characters,
        Stage::DeletedScenes,
        Stage::Metadata,
    ];

    /// Progress range, in percent, when the stage runs on its own
    fn range(self) -> (f64, f64) {
        match self {
            Stage::Manifest => (0.0, 10.0),
            Stage::Books => (20.0, 40.0),
            Stage::Chapters => (40.0, 65.0),
            Stage::Characters => (65.0, 80.0),
            Stage::DeletedScenes => (80.0, 90.0),
            Stage::Metadata => (90.0, 90.0),
        }
    }

    /// Share of a full load's progress
    fn weight(self) -> f64 {
        match self {
            Stage::Manifest => 10.0,
            Stage::Books => 20.0,
            Stage::Chapters => 25.0,
            Stage::Characters => 15.0,
            Stage::DeletedScenes => 10.0,
            Stage::Metadata => 10.0,
        }
    }
}

/// Owns the loading state and fans every change out to observers
///
/// Progress only moves forward until a new cycle starts or a full load
/// fails, so observers never see it decrease within one load. During a full
/// load the stages run concurrently, so each stage records how far through it
/// is and the published progress is their weighted sum.
pub(crate) struct StateTracker {
    state: Mutex<LoadingState>,
    stages: Mutex<Option<[f64; Stage::COUNT]>>,
    observers: Arc<Observers>,
}

impl StateTracker {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(LoadingState::default()),
            stages: Mutex::new(None),
            observers: Arc::new(Observers::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, LoadingState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn stages(&self) -> MutexGuard<'_, Option<[f64; Stage::COUNT]>> {
        self.stages.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn snapshot(&self) -> LoadingState {
        self.state().clone()
    }

    pub(crate) fn subscribe(&self, callback: StateCallback) -> Subscription {
        let id = self.observers.next_id.fetch_add(1, Ordering::Relaxed);
        self.observers.callbacks().push((id, callback));
        Subscription {
            id,
            observers: Arc::downgrade(&self.observers),
        }
    }

    #[cfg(test)]
    fn observer_count(&self) -> usize {
        self.observers.callbacks().len()
    }

    /// Applies a change, then notifies observers outside the lock
    fn update(&self, change: impl FnOnce(&mut LoadingState)) {
        let new_state = {
            let mut state = self.state();
            change(&mut state);
            state.clone()
        };

        for callback in self.observers.snapshot() {
            callback(&new_state);
        }
    }

    /// Starts a new cycle for a single operation
    pub(crate) fn begin(&self, item: &str) {
        *self.stages() = None;
        self.reset(item);
    }

    /// Starts a full load whose stages run concurrently
    pub(crate) fn begin_combined(&self, item: &str) {
        *self.stages() = Some([0.0; Stage::COUNT]);
        self.reset(item);
    }

    fn reset(&self, item: &str) {
        self.update(|state| {
            state.is_loading = true;
            state.progress = 0.0;
            state.error = None;
            state.current_item = item.to_string();
        });
    }

    /// Starts a cycle unless one is already running. Returns true if it
    /// started one.
    pub(crate) fn begin_if_idle(&self, item: &str) -> bool {
        let idle = !self.state().is_loading;
        if idle {
            self.begin(item);
        }
        idle
    }

    /// Moves on to `item`, `fraction` of the way through `stage`
    pub(crate) fn advance(&self, stage: Stage, item: &str, fraction: f64) {
        let target = self.target(stage, fraction);
        self.update(|state| {
            state.current_item = item.to_string();
            state.progress = raise(state.progress, target);
        });
    }

    /// Records that `stage` is `fraction` of the way through
    pub(crate) fn checkpoint(&self, stage: Stage, fraction: f64) {
        let target = self.target(stage, fraction);
        self.update(|state| state.progress = raise(state.progress, target));
    }

    /// Progress implied by `stage` reaching `fraction`
    fn target(&self, stage: Stage, fraction: f64) -> f64 {
        let fraction = fraction.clamp(0.0, 1.0);
        match self.stages().as_mut() {
            Some(done) => {
                let slot = &mut done[stage as usize];
                *slot = slot.max(fraction);
                combined(done)
            }
            None => {
                let (start, end) = stage.range();
                start + fraction * (end - start)
            }
        }
    }

    /// Ends the cycle after a successful full load
    pub(crate) fn complete(&self, item: &str) {
        *self.stages() = None;
        self.update(|state| {
            state.is_loading = false;
            state.progress = LoadingState::COMPLETE;
            state.current_item = item.to_string();
            state.last_loaded = Some(Utc::now());
        });
    }

    /// Ends a cycle started for a single operation, keeping its progress
    pub(crate) fn finish(&self) {
        self.update(|state| state.is_loading = false);
    }

    /// Ends a single operation with an error, keeping its progress
    pub(crate) fn abort(&self, message: String) {
        self.update(|state| {
            state.is_loading = false;
            state.error = Some(message);
        });
    }

    /// Ends a full load with an error and resets progress
    pub(crate) fn fail(&self, message: String) {
        *self.stages() = None;
        self.update(|state| {
            state.is_loading = false;
            state.progress = 0.0;
            state.error = Some(message);
        });
    }
}

fn raise(current: f64, target: f64) -> f64 {
    current.max(target).min(LoadingState::COMPLETE)
}

fn combined(done: &[f64; Stage::COUNT]) -> f64 {
    let total: f64 = Stage::ALL.iter().map(|stage| stage.weight()).sum();
    let reached: f64 = Stage::ALL
        .iter()
        .map(|stage| stage.weight() * done[*stage as usize])
        .sum();
    LoadingState::COMPLETE * reached / total
}

/// How far through a list of `total` items the one at `index` is
pub(crate) fn fraction(index: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    index as f64 / total as f64
}
