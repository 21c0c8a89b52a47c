//! Settings loading and startup progress tracking.
//!
//! The app waits in `AppState::Loading` until the settings file has loaded or
//! failed, then builds the scene with whichever settings are in force.

/// Loading progress tracking resource for state transitions.
pub mod progress;

/// `ProfileSettings` JSON loading with fallback to compiled-in defaults.
pub mod settings_loader;
