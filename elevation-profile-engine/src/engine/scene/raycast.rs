use bevy::picking::mesh_picking::ray_cast::{MeshRayCast, MeshRayCastSettings, RayCastVisibility};
use bevy::prelude::*;
use std::collections::HashSet;

/// Marks entities this tool draws into the scene. Ray casts never hit them.
#[derive(Component, Default)]
pub struct ProfileOverlay;

/// Intersection queries against the scene graph.
pub trait SceneRaycast {
    /// World-space hit points along `ray`, nearest first.
    fn intersect(&mut self, ray: Ray3d) -> Vec<Vec3>;

    /// Nearest hit along `ray`, if any.
    fn nearest_hit(&mut self, ray: Ray3d) -> Option<Vec3> {
        self.intersect(ray).into_iter().next()
    }
}

/// Mesh-accurate ray casting over every mesh entity in the world, skipping
/// overlays.
pub struct MeshSceneRaycast<'a, 'w, 's> {
    ray_cast: &'a mut MeshRayCast<'w, 's>,
    excluded: HashSet<Entity>,
}

impl<'a, 'w, 's> MeshSceneRaycast<'a, 'w, 's> {
    pub fn new(
        ray_cast: &'a mut MeshRayCast<'w, 's>,
        excluded: impl IntoIterator<Item = Entity>,
    ) -> Self {
        Self {
            ray_cast,
            excluded: excluded.into_iter().collect(),
        }
    }
}

impl SceneRaycast for MeshSceneRaycast<'_, '_, '_> {
    fn intersect(&mut self, ray: Ray3d) -> Vec<Vec3> {
        let excluded = &self.excluded;
        let filter = |entity: Entity| !excluded.contains(&entity);
        let settings = MeshRayCastSettings::default()
            .with_visibility(RayCastVisibility::Any)
            .with_filter(&filter)
            .never_early_exit();

        // Hits come back sorted by distance.
        self.ray_cast
            .cast_ray(ray, &settings)
            .iter()
            .map(|(_, hit)| hit.point)
            .collect()
    }
}

/// Analytic surface used by tests and headless tooling: a set of height
/// functions over the X/Y plane, each optionally limited to a rectangle.
#[derive(Default)]
pub struct HeightfieldScene {
    surfaces: Vec<Heightfield>,
}

struct Heightfield {
    height: Box<dyn Fn(f32, f32) -> f32 + Send + Sync>,
    extent: Option<Rect>,
}

impl HeightfieldScene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a surface covering the whole plane.
    pub fn with_surface(mut self, height: impl Fn(f32, f32) -> f32 + Send + Sync + 'static) -> Self {
        self.surfaces.push(Heightfield {
            height: Box::new(height),
            extent: None,
        });
        self
    }

    /// Add a surface covering only `extent` in the X/Y plane.
    pub fn with_bounded_surface(
        mut self,
        extent: Rect,
        height: impl Fn(f32, f32) -> f32 + Send + Sync + 'static,
    ) -> Self {
        self.surfaces.push(Heightfield {
            height: Box::new(height),
            extent: Some(extent),
        });
        self
    }
}

impl SceneRaycast for HeightfieldScene {
    fn intersect(&mut self, ray: Ray3d) -> Vec<Vec3> {
        let direction: Vec3 = *ray.direction;
        let mut hits: Vec<(f32, Vec3)> = Vec::new();

        for surface in &self.surfaces {
            if direction.x == 0.0 && direction.y == 0.0 {
                // Vertical ray: one evaluation at the ray's footprint.
                let (x, y) = (ray.origin.x, ray.origin.y);
                if surface
                    .extent
                    .is_some_and(|rect| !rect.contains(Vec2::new(x, y)))
                {
                    continue;
                }
                let z = (surface.height)(x, y);
                let t = (z - ray.origin.z) / direction.z;
                if t >= 0.0 {
                    hits.push((t, Vec3::new(x, y, z)));
                }
            } else if let Some(hit) = march_to_surface(&ray, surface) {
                hits.push(hit);
            }
        }

        hits.sort_by(|a, b| a.0.total_cmp(&b.0));
        hits.into_iter().map(|(_, point)| point).collect()
    }
}

/// Step along the ray until it crosses the surface, then bisect.
fn march_to_surface(ray: &Ray3d, surface: &Heightfield) -> Option<(f32, Vec3)> {
    const STEP: f32 = 0.05;
    const MAX_DISTANCE: f32 = 500.0;

    let above = |t: f32| -> Option<f32> {
        let p = ray.get_point(t);
        if surface
            .extent
            .is_some_and(|rect| !rect.contains(Vec2::new(p.x, p.y)))
        {
            return None;
        }
        Some(p.z - (surface.height)(p.x, p.y))
    };

    let mut t_prev = 0.0;
    let mut d_prev = above(t_prev);
    let mut t = STEP;
    while t <= MAX_DISTANCE {
        let d = above(t);
        if let (Some(a), Some(b)) = (d_prev, d) {
            if a.signum() != b.signum() {
                let (mut lo, mut hi) = (t_prev, t);
                for _ in 0..24 {
                    let mid = 0.5 * (lo + hi);
                    match above(mid) {
                        Some(m) if m.signum() == a.signum() => lo = mid,
                        _ => hi = mid,
                    }
                }
                let p = ray.get_point(hi);
                return Some((hi, Vec3::new(p.x, p.y, (surface.height)(p.x, p.y))));
            }
        }
        t_prev = t;
        d_prev = d;
        t += STEP;
    }
    None
}
