use bevy::math::{Dir3, Vec3};

/// World up axis. Sampling happens in the X/Y plane and elevation is Z.
pub const UP_AXIS: Vec3 = Vec3::Z;

/// Direction of the first elevation probe.
pub const PROBE_DOWN: Dir3 = Dir3::NEG_Z;

/// Direction of the fallback elevation probe.
pub const PROBE_UP: Dir3 = Dir3::Z;

/// Elevation the vertical probes start from.
pub const PROBE_ORIGIN_ELEVATION: f32 = 0.0;

/// Project a world point onto the sampling plane.
pub fn to_sampling_plane(point: Vec3) -> (f32, f32) {
    (point.x, point.y)
}

/// Lift a sampling-plane coordinate to a probe origin.
pub fn probe_origin(x: f32, y: f32, elevation: f32) -> Vec3 {
    Vec3::new(x, y, elevation)
}
