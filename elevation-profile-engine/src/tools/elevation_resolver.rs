//! Vertical elevation probing for sampled line coordinates.
//!
//! Each sampled (x, y) is probed from a fixed origin elevation, first
//! downward, then upward if nothing lies below. Points with no surface in
//! either direction are skipped, so the output can be shorter than the input
//! but always keeps the input order.

use std::collections::VecDeque;
use std::time::Duration;

use bevy::picking::mesh_picking::ray_cast::MeshRayCast;
use bevy::prelude::*;
use constants::coordinate_system::{PROBE_DOWN, PROBE_UP, probe_origin};
use serde::{Deserialize, Serialize};

use crate::engine::assets::profile_settings::ProfileSettings;
use crate::engine::scene::raycast::{MeshSceneRaycast, ProfileOverlay, SceneRaycast};
use crate::rpc::web_rpc::WebRpcInterface;
use crate::tools::line_sampler::SampledPoint;
use crate::tools::profile_chart::profile_series;
use crate::tools::profile_error::ProfileError;

/// A sampled coordinate with its resolved surface elevation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationSample {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl ElevationSample {
    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

impl From<Vec3> for ElevationSample {
    fn from(point: Vec3) -> Self {
        Self {
            x: point.x,
            y: point.y,
            z: point.z,
        }
    }
}

/// Probe a single coordinate: down first, up only when nothing is below.
pub fn resolve_point(
    scene: &mut dyn SceneRaycast,
    point: SampledPoint,
    origin_elevation: f32,
) -> Option<ElevationSample> {
    let origin = probe_origin(point.x, point.y, origin_elevation);

    scene
        .nearest_hit(Ray3d::new(origin, PROBE_DOWN))
        .or_else(|| scene.nearest_hit(Ray3d::new(origin, PROBE_UP)))
        .map(ElevationSample::from)
}

/// Resolve every sampled coordinate, dropping the ones with no surface.
pub fn resolve_elevations(
    scene: &mut dyn SceneRaycast,
    points: &[SampledPoint],
    origin_elevation: f32,
) -> Vec<ElevationSample> {
    let mut samples = Vec::with_capacity(points.len());

    for (index, point) in points.iter().enumerate() {
        match resolve_point(scene, *point, origin_elevation) {
            Some(sample) => {
                debug!(
                    "Sample {} at ({}, {}) resolved to z = {}",
                    index, point.x, point.y, sample.z
                );
                samples.push(sample);
            }
            None => ProfileError::UnresolvedElevationPoint {
                index,
                x: point.x,
                y: point.y,
            }
            .log(),
        }
    }

    samples
}

/// Most recently resolved profile, served to the frontend on request.
#[derive(Resource, Debug, Default)]
pub struct ElevationProfile {
    pub samples: Vec<ElevationSample>,
}

/// Fired once per resolved sequence, whatever its length.
#[derive(Event, Debug, Clone)]
pub struct ElevationProfileResolved {
    pub samples: Vec<ElevationSample>,
}

struct PendingResolution {
    points: Vec<SampledPoint>,
    timer: Timer,
}

/// Completed sample sequences waiting out the resolve delay.
#[derive(Resource, Default)]
pub struct PendingResolutions {
    queue: VecDeque<PendingResolution>,
}

impl PendingResolutions {
    pub fn push(&mut self, points: Vec<SampledPoint>, delay: Duration) {
        self.queue.push_back(PendingResolution {
            points,
            timer: Timer::new(delay, TimerMode::Once),
        });
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Advance every timer and pop the sequences that are due, oldest first.
    /// An entry is never released ahead of an older one still waiting.
    pub fn drain_due(&mut self, delta: Duration) -> Vec<Vec<SampledPoint>> {
        for pending in &mut self.queue {
            pending.timer.tick(delta);
        }

        let mut due = Vec::new();
        while self.queue.front().is_some_and(|p| p.timer.finished()) {
            if let Some(pending) = self.queue.pop_front() {
                due.push(pending.points);
            }
        }
        due
    }
}

/// Resolve queued sequences against the live scene once their delay elapses.
pub fn resolve_due_profiles(
    time: Res<Time>,
    settings: Res<ProfileSettings>,
    mut pending: ResMut<PendingResolutions>,
    mut ray_cast: MeshRayCast,
    overlays: Query<Entity, With<ProfileOverlay>>,
    mut profile: ResMut<ElevationProfile>,
    mut resolved: EventWriter<ElevationProfileResolved>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    if pending.is_empty() {
        return;
    }

    let due = pending.drain_due(time.delta());
    if due.is_empty() {
        return;
    }

    let mut scene = MeshSceneRaycast::new(&mut ray_cast, overlays.iter());
    for points in due {
        let samples = resolve_elevations(
            &mut scene,
            &points,
            settings.resolution.probe_origin_elevation,
        );
        info!(
            "Elevation profile resolved: {} of {} samples",
            samples.len(),
            points.len()
        );

        let series: Vec<[f32; 2]> = profile_series(&samples)
            .into_iter()
            .map(|p| [p.x, p.y])
            .collect();
        rpc_interface.send_notification(
            "elevation_profile",
            serde_json::json!({
                "samples": samples,
                "series": series,
            }),
        );

        profile.samples = samples.clone();
        resolved.write(ElevationProfileResolved { samples });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scene::raycast::HeightfieldScene;
    use crate::engine::scene::raycast::test_surfaces::{init_task_pools, spawn_flat_surface};
    use bevy::ecs::event::Events;

    #[test]
    fn downward_hit_wins_over_upward() {
        let mut scene = HeightfieldScene::new()
            .with_surface(|_, _| 3.0)
            .with_surface(|_, _| -2.0);

        let sample = resolve_point(&mut scene, SampledPoint::new(1.0, 1.0), 0.0).unwrap();
        assert_eq!(sample.z, -2.0);
    }

    #[test]
    fn upward_probe_used_when_nothing_below() {
        let mut scene = HeightfieldScene::new().with_surface(|x, _| 1.0 + x);

        let sample = resolve_point(&mut scene, SampledPoint::new(0.5, 0.0), 0.0).unwrap();
        assert_eq!(sample, ElevationSample { x: 0.5, y: 0.0, z: 1.5 });
    }

    #[test]
    fn unresolved_points_are_skipped_in_order() {
        // Terrain everywhere except a hole around x = 1.
        let mut scene = HeightfieldScene::new()
            .with_bounded_surface(Rect::new(-10.0, -10.0, 0.5, 10.0), |x, _| -x)
            .with_bounded_surface(Rect::new(1.5, -10.0, 10.0, 10.0), |x, _| -x);

        let points = [
            SampledPoint::new(0.0, 0.0),
            SampledPoint::new(1.0, 0.0),
            SampledPoint::new(2.0, 0.0),
        ];
        let samples = resolve_elevations(&mut scene, &points, 0.0);

        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].x, 0.0);
        assert_eq!(samples[1].x, 2.0);
        assert_eq!(samples[1].z, -2.0);
    }

    #[test]
    fn probe_origin_elevation_is_respected() {
        let mut scene = HeightfieldScene::new().with_surface(|_, _| 5.0);

        // From 10 the surface is below, so the downward probe finds it.
        let sample = resolve_point(&mut scene, SampledPoint::new(0.0, 0.0), 10.0).unwrap();
        assert_eq!(sample.z, 5.0);
    }

    #[test]
    fn pending_queue_releases_in_fifo_order() {
        let mut pending = PendingResolutions::default();
        pending.push(vec![SampledPoint::new(0.0, 0.0)], Duration::from_millis(500));
        pending.push(vec![SampledPoint::new(1.0, 0.0)], Duration::from_millis(100));

        // The second entry is due first but waits behind the first.
        assert!(pending.drain_due(Duration::from_millis(200)).is_empty());

        let due = pending.drain_due(Duration::from_millis(300));
        assert_eq!(due.len(), 2);
        assert_eq!(due[0][0].x, 0.0);
        assert_eq!(due[1][0].x, 1.0);
        assert!(pending.is_empty());
    }

    #[test]
    fn zero_delay_is_due_immediately() {
        let mut pending = PendingResolutions::default();
        pending.push(vec![SampledPoint::new(0.0, 0.0)], Duration::ZERO);
        assert_eq!(pending.drain_due(Duration::ZERO).len(), 1);
    }

    fn resolver_app() -> App {
        init_task_pools();
        let mut app = App::new();
        app.add_event::<ElevationProfileResolved>()
            .init_resource::<Time>()
            .init_resource::<Assets<Mesh>>()
            .init_resource::<PendingResolutions>()
            .init_resource::<ElevationProfile>()
            .init_resource::<WebRpcInterface>()
            .insert_resource(ProfileSettings::default())
            .add_systems(Update, resolve_due_profiles);
        app
    }

    fn advance(app: &mut App, millis: u64) {
        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(millis));
        app.update();
    }

    #[test]
    fn due_sequence_resolves_against_scene_meshes() {
        let mut app = resolver_app();
        spawn_flat_surface(app.world_mut(), -1.0, 4.0);
        app.world_mut().resource_mut::<PendingResolutions>().push(
            vec![SampledPoint::new(0.3, 0.7), SampledPoint::new(-0.5, 0.2)],
            Duration::from_millis(500),
        );

        advance(&mut app, 300);
        assert_eq!(app.world().resource::<PendingResolutions>().len(), 1);
        assert!(app.world().resource::<Events<ElevationProfileResolved>>().is_empty());
        assert!(app.world().resource::<ElevationProfile>().samples.is_empty());

        advance(&mut app, 300);
        assert!(app.world().resource::<PendingResolutions>().is_empty());

        let events = app.world().resource::<Events<ElevationProfileResolved>>();
        let resolved: Vec<_> = events.iter_current_update_events().collect();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].samples.len(), 2);

        let profile = &app.world().resource::<ElevationProfile>().samples;
        assert_eq!(profile.len(), 2);
        assert!((profile[0].x - 0.3).abs() < 1e-5);
        assert!((profile[1].x - -0.5).abs() < 1e-5);
        assert!(profile.iter().all(|s| (s.z - -1.0).abs() < 1e-5));

        let notification = app
            .world()
            .resource::<WebRpcInterface>()
            .pending_notifications()
            .last()
            .map(|n| n.method.clone());
        assert_eq!(notification.as_deref(), Some("elevation_profile"));
    }

    #[test]
    fn profile_overlays_are_skipped_when_resolving() {
        let mut app = resolver_app();
        spawn_flat_surface(app.world_mut(), -1.0, 4.0);
        let overlay = spawn_flat_surface(app.world_mut(), -0.5, 4.0);
        app.world_mut().entity_mut(overlay).insert(ProfileOverlay);
        app.world_mut()
            .resource_mut::<PendingResolutions>()
            .push(vec![SampledPoint::new(0.3, 0.7)], Duration::ZERO);

        advance(&mut app, 16);

        let profile = &app.world().resource::<ElevationProfile>().samples;
        assert_eq!(profile.len(), 1);
        assert!((profile[0].z - -1.0).abs() < 1e-5);
    }
}
