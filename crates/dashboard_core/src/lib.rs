//! Orchestration core of the acoustic-survey dashboard: a single-writer
//! store with slice reducers, the intent layer that turns user gestures into
//! actions, the update orchestrator that decides what to re-render after each
//! transition, and the synchronizer that issues audio-engine commands.

pub mod actions;
pub mod audio_sync;
pub mod debounce;
pub mod error;
pub mod intents;
pub mod orchestrator;
pub mod reducers;
pub mod store;

pub use audio_sync::{synchronize_audio, AudioSink};
pub use debounce::{ViewportDebouncer, DEFAULT_VIEWPORT_DEBOUNCE};
pub use error::{AudioContextMissing, IntentDeclined};
pub use intents::{Intent, Modifiers};
pub use orchestrator::{
    ChangeSet, ChartHost, DataDetails, DataProcessor, RegionMetricsUpdate, UpdateOrchestrator,
};
pub use reducers::root_reducer;
pub use store::{Store, StoreListener, Subscription};

/// Narrowest region an intent will create or resize to.
pub const MIN_REGION_WIDTH_MS: f64 = 100.0;
/// Keyboard step used before the data layer has reported one.
pub const DEFAULT_KEYBOARD_STEP_MS: f64 = 1000.0;
/// Ctrl+tap removes the nearest marker within this share of the viewport span.
pub const MARKER_HIT_FRACTION: f64 = 0.01;
/// Marker hit tolerance when no viewport has been reported yet.
pub const MARKER_HIT_FALLBACK_MS: f64 = 1000.0;
