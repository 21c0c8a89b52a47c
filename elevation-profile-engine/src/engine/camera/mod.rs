//! Viewport camera for terrain navigation and click ray projection.
//!
//! Provides a Z-up orbit camera with mouse and keyboard controls, and the
//! projector that turns normalised device coordinates into world rays.

/// Camera-backed ray projection from normalised device coordinates.
pub mod ray_projector;

/// Viewport camera resource and controller system for scene navigation.
pub mod viewport_camera;
