//! Line drawing and elevation profiling tools.
//!
//! Two clicks on the rendered surface define a line. The line is sampled at
//! an adaptive step along X, every sample is probed vertically for the surface
//! elevation, and the resolved profile is shown as a smooth 3D curve plus a 2D
//! chart.
//!
//! ## Pick Flow
//!
//! ```text
//! LineDrawingCommand (RPC / keyboard / button)
//!   └─> handle_line_drawing_commands()
//!       └─> PointerRayCaster enable/disable
//!
//! Left click (while enabled)
//!   └─> pointer_click_system()
//!       └─> WorldPointPicked
//!           └─> line_pick_system()
//!               ├─> LineSampler::push()  Idle -> OnePicked -> Idle
//!               └─> PendingResolutions (after resolve_delay_ms)
//!                   └─> resolve_due_profiles()
//!                       └─> ElevationProfileResolved
//!                           ├─> build_elevation_curve()
//!                           └─> spawn_profile_charts()
//! ```
//!
//! ## Sampling
//!
//! - Lines of at least 1.0 units use a 0.5 step, shorter lines use 0.2
//! - Coordinates are rounded to 2 decimals
//! - Both picked endpoints are always part of the sequence
//! - Pairs closer than 0.1 are rejected before anything is drawn
//! - Pairs sharing the same X are rejected after the segment is drawn
//!
//! ## Elevation Probing
//!
//! Each sample is probed from a fixed origin elevation straight down, and
//! straight up only if nothing is below. Samples with no surface in either
//! direction are skipped. Drawn overlays carry `ProfileOverlay` and are never
//! hit by probes or clicks.
//!
//! ## Cross-Platform Considerations
//!
//! - Native: `L` toggles line drawing, `Escape` disables it, and an on-screen
//!   button mirrors the state
//! - WASM: line drawing is controlled via RPC from the embedding page

/// Centripetal Catmull-Rom curve through resolved samples.
///
/// Keeps exactly one tagged curve in the scene.
pub mod curve_builder;

/// Vertical down-then-up probing and the deferred resolution queue.
pub mod elevation_resolver;

/// Two-point pick buffer and adaptive line sampling.
pub mod line_sampler;

/// Click listener, screen to NDC mapping and pick feedback overlays.
pub mod pointer_ray;

/// Stacked 2D elevation charts built from Bevy UI nodes.
pub mod profile_chart;

/// Non-fatal pick and profile conditions.
pub mod profile_error;

/// Line drawing command handling and keyboard shortcuts.
///
/// Applies enable/disable/toggle requests and notifies the frontend on change.
pub mod tool_manager;
