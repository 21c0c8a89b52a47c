//! Runtime systems for diagnostics and on-screen controls.

/// FPS tracking and notification systems for performance monitoring.
///
/// Sends frame rate updates to frontend via RPC and updates native UI overlays.
pub mod fps_tracking;

/// Native toggle button and state label for line drawing.
pub mod line_drawing_toggle;
