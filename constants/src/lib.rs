//! Shared tunables for the elevation profile engine.
//!
//! Values here are defaults only; the engine's `ProfileSettings` asset can
//! override every one of them at runtime.

/// Vertical axis conventions for picking and elevation probes.
pub mod coordinate_system;

/// Overlay geometry sizes and colours.
pub mod render_settings;

/// Line sampling thresholds, step sizes and resolution timing.
pub mod sampling;
