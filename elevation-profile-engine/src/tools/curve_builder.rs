//! Smooth 3D curve through resolved elevation samples.
//!
//! The curve is an open centripetal Catmull-Rom spline (alpha = 0.5). Its
//! parameterisation follows the distance between samples, which keeps it from
//! overshooting or forming loops when samples are unevenly spaced. Only one
//! curve is kept in the scene; a new profile replaces the previous curve.

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::PrimitiveTopology;
use bevy::render::view::RenderLayers;
use constants::render_settings::CURVE_COLOUR;

use crate::engine::assets::profile_settings::ProfileSettings;
use crate::engine::scene::raycast::ProfileOverlay;
use crate::tools::elevation_resolver::{ElevationProfileResolved, ElevationSample};
use crate::tools::profile_error::ProfileError;

/// Knot intervals below this are treated as coincident points.
const MIN_KNOT_INTERVAL: f32 = 1e-4;

/// Tag of the single active elevation curve.
#[derive(Component)]
pub struct ElevationCurve;

/// Cubic coefficients of one span, evaluated as `c0 + c1 t + c2 t^2 + c3 t^3`.
struct CubicSpan([Vec3; 4]);

impl CubicSpan {
    fn centripetal(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3) -> Self {
        let mut dt0 = p0.distance_squared(p1).powf(0.25);
        let mut dt1 = p1.distance_squared(p2).powf(0.25);
        let mut dt2 = p2.distance_squared(p3).powf(0.25);

        if dt1 < MIN_KNOT_INTERVAL {
            dt1 = 1.0;
        }
        if dt0 < MIN_KNOT_INTERVAL {
            dt0 = dt1;
        }
        if dt2 < MIN_KNOT_INTERVAL {
            dt2 = dt1;
        }

        let t1 = ((p1 - p0) / dt0 - (p2 - p0) / (dt0 + dt1) + (p2 - p1) / dt1) * dt1;
        let t2 = ((p2 - p1) / dt1 - (p3 - p1) / (dt1 + dt2) + (p3 - p2) / dt2) * dt1;

        Self([
            p1,
            t1,
            -3.0 * p1 + 3.0 * p2 - 2.0 * t1 - t2,
            2.0 * p1 - 2.0 * p2 + t1 + t2,
        ])
    }

    fn at(&self, t: f32) -> Vec3 {
        let [c0, c1, c2, c3] = self.0;
        c0 + t * (c1 + t * (c2 + t * c3))
    }
}

/// Tessellate an open centripetal Catmull-Rom curve through `points`.
///
/// Every input point appears in the output at index `i * segments_per_span`.
/// Fewer than two points yields them unchanged.
pub fn centripetal_catmull_rom(points: &[Vec3], segments_per_span: usize) -> Vec<Vec3> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let segments = segments_per_span.max(1);
    let last = points.len() - 1;
    let mut curve = Vec::with_capacity(last * segments + 1);

    for i in 0..last {
        let p1 = points[i];
        let p2 = points[i + 1];
        // Open ends mirror the neighbour across the endpoint.
        let p0 = if i == 0 { 2.0 * p1 - p2 } else { points[i - 1] };
        let p3 = if i + 1 == last {
            2.0 * p2 - p1
        } else {
            points[i + 2]
        };

        let span = CubicSpan::centripetal(p0, p1, p2, p3);
        curve.push(p1);
        for step in 1..segments {
            curve.push(span.at(step as f32 / segments as f32));
        }
    }
    curve.push(points[last]);
    curve
}

/// Line-strip mesh of the tessellated curve through `samples`.
pub fn elevation_curve_mesh(
    samples: &[ElevationSample],
    segments_per_span: usize,
) -> Result<Mesh, ProfileError> {
    if samples.len() < 2 {
        return Err(ProfileError::InsufficientElevationSamples {
            resolved: samples.len(),
        });
    }

    let points: Vec<Vec3> = samples.iter().map(ElevationSample::position).collect();
    let positions: Vec<[f32; 3]> = centripetal_catmull_rom(&points, segments_per_span)
        .into_iter()
        .map(|p| p.to_array())
        .collect();

    let mut mesh = Mesh::new(PrimitiveTopology::LineStrip, RenderAssetUsages::default());
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
    Ok(mesh)
}

/// Replace the active curve with one built from each resolved profile.
pub fn build_elevation_curve(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut events: EventReader<ElevationProfileResolved>,
    existing: Query<Entity, With<ElevationCurve>>,
    settings: Res<ProfileSettings>,
) {
    // Tracks curves spawned earlier in this frame as well as older ones.
    let mut active: Vec<Entity> = existing.iter().collect();

    for event in events.read() {
        let mesh = match elevation_curve_mesh(&event.samples, settings.curve.segments_per_span) {
            Ok(mesh) => mesh,
            Err(err) => {
                err.log();
                continue;
            }
        };

        for entity in active.drain(..) {
            commands.entity(entity).despawn();
        }

        let curve = commands
            .spawn((
                Mesh3d(meshes.add(mesh)),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: CURVE_COLOUR,
                    emissive: CURVE_COLOUR.into(),
                    unlit: true,
                    ..default()
                })),
                Transform::IDENTITY,
                ElevationCurve,
                ProfileOverlay,
                Name::new("Elevation curve"),
                RenderLayers::layer(1),
            ))
            .id();
        active.push(curve);

        info!("Elevation curve built through {} samples", event.samples.len());
    }
}
