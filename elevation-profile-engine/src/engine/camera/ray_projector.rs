use bevy::prelude::*;

/// Produces world-space rays from normalised device coordinates.
///
/// Rays start on the near plane and point away from the viewer.
/// Implementations own the depth convention of their projection.
pub trait RayProjector {
    fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray3d>;
}

/// Projects through a live Bevy camera.
///
/// Assumes Bevy's reverse-z projections, where NDC depth 1 is the near plane
/// and depth 0 is the far plane (at infinity for perspective). This is the
/// same convention `Camera::viewport_to_world` relies on. A custom
/// projection with forward-z would produce rays pointing at the viewer.
pub struct CameraProjector<'a> {
    camera: &'a Camera,
    transform: &'a GlobalTransform,
}

impl<'a> CameraProjector<'a> {
    pub fn new(camera: &'a Camera, transform: &'a GlobalTransform) -> Self {
        Self { camera, transform }
    }
}

impl RayProjector for CameraProjector<'_> {
    fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray3d> {
        // Depth 0 is NaN for an infinite far plane, so step just inside it.
        let near = self.camera.ndc_to_world(self.transform, ndc.extend(1.0))?;
        let far = self
            .camera
            .ndc_to_world(self.transform, ndc.extend(f32::EPSILON))?;
        let direction = Dir3::new(far - near).ok()?;
        Some(Ray3d::new(near, direction))
    }
}
