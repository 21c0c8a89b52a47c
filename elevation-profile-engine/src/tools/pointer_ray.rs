use std::time::Duration;

use bevy::picking::mesh_picking::ray_cast::MeshRayCast;
use bevy::prelude::*;
use bevy::render::view::RenderLayers;
use bevy::window::PrimaryWindow;
use constants::render_settings::{
    DRAW_LINE_WIDTH, PICK_MARKER_COLOUR, PICK_MARKER_SIZE, SEGMENT_COLOUR,
};

use crate::engine::assets::profile_settings::ProfileSettings;
use crate::engine::camera::ray_projector::{CameraProjector, RayProjector};
use crate::engine::scene::raycast::{MeshSceneRaycast, ProfileOverlay, SceneRaycast};
use crate::rpc::web_rpc::WebRpcInterface;
use crate::tools::elevation_resolver::PendingResolutions;
use crate::tools::line_sampler::{LineSampler, LineSegment, PickOutcome};
use crate::tools::profile_error::ProfileError;

/// Click listener state. While listening, left clicks on the render surface
/// are turned into world points and fed to the `LineSampler`.
#[derive(Resource, Debug, Default)]
pub struct PointerRayCaster {
    listening: bool,
}

impl PointerRayCaster {
    pub fn is_enabled(&self) -> bool {
        self.listening
    }

    /// Start listening with an empty pick buffer. Returns false if already on.
    pub fn enable(&mut self, sampler: &mut LineSampler) -> bool {
        if self.listening {
            return false;
        }
        sampler.reset();
        self.listening = true;
        info!("Line drawing enabled");
        true
    }

    /// Stop listening and drop any half-finished pick. Returns false if
    /// already off.
    pub fn disable(&mut self, sampler: &mut LineSampler) -> bool {
        if !self.listening {
            return false;
        }
        sampler.reset();
        self.listening = false;
        info!("Line drawing disabled");
        true
    }

    /// Flip the listener. Returns the new state.
    pub fn toggle(&mut self, sampler: &mut LineSampler) -> bool {
        if self.listening {
            self.disable(sampler);
        } else {
            self.enable(sampler);
        }
        self.listening
    }
}

/// Run condition gating the click listener.
pub fn line_drawing_enabled(caster: Res<PointerRayCaster>) -> bool {
    caster.is_enabled()
}

/// Map a cursor position inside `viewport` to normalised device coordinates.
/// `None` when the cursor is outside the render surface.
pub fn screen_to_ndc(cursor: Vec2, viewport: Rect) -> Option<Vec2> {
    if viewport.width() <= 0.0 || viewport.height() <= 0.0 || !viewport.contains(cursor) {
        return None;
    }
    Some(Vec2::new(
        ((cursor.x - viewport.min.x) / viewport.width()) * 2.0 - 1.0,
        -((cursor.y - viewport.min.y) / viewport.height()) * 2.0 + 1.0,
    ))
}

/// Everything a click needs to become a world point.
pub struct ClickContext<'a> {
    pub cursor: Vec2,
    pub viewport: Rect,
    pub projector: &'a dyn RayProjector,
}

/// Resolve a click to the nearest surface point under the cursor.
pub fn handle_click(
    context: &ClickContext,
    scene: &mut dyn SceneRaycast,
) -> Result<Vec3, ProfileError> {
    let ndc = screen_to_ndc(context.cursor, context.viewport)
        .ok_or(ProfileError::OutsideRenderSurface)?;
    let ray = context
        .projector
        .ray_from_ndc(ndc)
        .ok_or(ProfileError::NoIntersection)?;
    scene.nearest_hit(ray).ok_or(ProfileError::NoIntersection)
}

/// A surface point accepted from a click.
#[derive(Event, Debug, Clone, Copy)]
pub struct WorldPointPicked(pub Vec3);

/// Marker at the first point of an unfinished pair.
#[derive(Component)]
pub struct FirstPickMarker;

/// Straight segment drawn between the two picks.
#[derive(Component)]
pub struct LineSegmentOverlay;

/// True when the pointer is over an interactive UI node (buttons, chart
/// panels). Such clicks never reach the scene.
pub fn ui_captures_pointer<'a>(interactions: impl IntoIterator<Item = &'a Interaction>) -> bool {
    interactions
        .into_iter()
        .any(|interaction| *interaction != Interaction::None)
}

/// Turn left clicks on the render surface into `WorldPointPicked` events.
pub fn pointer_click_system(
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera3d>>,
    interactions: Query<&Interaction>,
    mut ray_cast: MeshRayCast,
    overlays: Query<Entity, With<ProfileOverlay>>,
    mut picked: EventWriter<WorldPointPicked>,
) {
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }

    if ui_captures_pointer(interactions.iter()) {
        return;
    }

    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let Some(viewport) = camera.logical_viewport_rect() else {
        return;
    };

    let projector = CameraProjector::new(camera, camera_transform);
    let context = ClickContext {
        cursor,
        viewport,
        projector: &projector,
    };
    let mut scene = MeshSceneRaycast::new(&mut ray_cast, overlays.iter());

    match handle_click(&context, &mut scene) {
        Ok(point) => {
            debug!("Picked surface point {:?}", point);
            picked.write(WorldPointPicked(point));
        }
        Err(err) => err.log(),
    }
}

/// Feed picked points to the sampler and draw the feedback overlays.
pub fn line_pick_system(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut picked: EventReader<WorldPointPicked>,
    markers: Query<Entity, With<FirstPickMarker>>,
    mut sampler: ResMut<LineSampler>,
    settings: Res<ProfileSettings>,
    mut pending: ResMut<PendingResolutions>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    // A marker spawned earlier in this run is not visible to `markers` yet.
    let mut fresh_marker: Option<Entity> = None;

    for WorldPointPicked(point) in picked.read() {
        let index = sampler.buffered();
        rpc_interface.send_notification(
            "line_point_picked",
            serde_json::json!({
                "index": index,
                "position": [point.x, point.y, point.z],
            }),
        );

        match sampler.push(*point, &settings.sampling) {
            PickOutcome::Started(first) => {
                info!("First line point picked at {:?}", first);
                fresh_marker = Some(spawn_pick_marker(
                    &mut commands,
                    &mut meshes,
                    &mut materials,
                    first,
                ));
            }
            PickOutcome::Completed { segment, points } => {
                clear_pick_markers(&mut commands, &markers);
                if let Some(marker) = fresh_marker.take() {
                    commands.entity(marker).despawn();
                }
                spawn_segment(&mut commands, &mut meshes, &mut materials, segment);

                info!("Line sampled into {} points", points.len());
                rpc_interface.send_notification(
                    "line_sampled",
                    serde_json::json!({ "points": points }),
                );

                let delay = Duration::from_millis(settings.resolution.resolve_delay_ms);
                pending.push(points, delay);
            }
            PickOutcome::Aborted { segment, reason } => {
                clear_pick_markers(&mut commands, &markers);
                if let Some(marker) = fresh_marker.take() {
                    commands.entity(marker).despawn();
                }
                if let Some(segment) = segment {
                    spawn_segment(&mut commands, &mut meshes, &mut materials, segment);
                }

                reason.log();
                rpc_interface.send_notification(
                    "line_pick_aborted",
                    serde_json::json!({
                        "reason": reason.code(),
                        "message": reason.to_string(),
                    }),
                );
            }
        }
    }
}

/// Remove the first-pick marker, if one is shown.
pub fn clear_pick_markers(commands: &mut Commands, markers: &Query<Entity, With<FirstPickMarker>>) {
    for entity in markers.iter() {
        commands.entity(entity).despawn();
    }
}

fn spawn_pick_marker(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    position: Vec3,
) -> Entity {
    commands
        .spawn((
            Mesh3d(meshes.add(Sphere::new(PICK_MARKER_SIZE))),
            MeshMaterial3d(materials.add(StandardMaterial {
                base_color: PICK_MARKER_COLOUR,
                emissive: PICK_MARKER_COLOUR.into(),
                unlit: true,
                ..default()
            })),
            Transform::from_translation(position),
            FirstPickMarker,
            ProfileOverlay,
            RenderLayers::layer(1),
        ))
        .id()
}

fn spawn_segment(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    segment: LineSegment,
) {
    let delta = segment.end - segment.start;
    let Ok(direction) = Dir3::new(delta) else {
        return;
    };
    let midpoint = (segment.start + segment.end) * 0.5;

    commands.spawn((
        Mesh3d(meshes.add(Cuboid::new(delta.length(), DRAW_LINE_WIDTH, DRAW_LINE_WIDTH))),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: SEGMENT_COLOUR,
            emissive: SEGMENT_COLOUR.into(),
            unlit: true,
            ..default()
        })),
        Transform::from_translation(midpoint)
            .with_rotation(Quat::from_rotation_arc(Vec3::X, *direction)),
        LineSegmentOverlay,
        ProfileOverlay,
        RenderLayers::layer(1),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::scene::raycast::HeightfieldScene;
    use bevy::ecs::event::Events;

    /// Orthographic top-down projector over a square of half-width `extent`.
    struct TopDown {
        extent: f32,
    }

    impl RayProjector for TopDown {
        fn ray_from_ndc(&self, ndc: Vec2) -> Option<Ray3d> {
            let origin = (ndc * self.extent).extend(50.0);
            Some(Ray3d::new(origin, Dir3::NEG_Z))
        }
    }

    fn viewport() -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }

    #[test]
    fn ndc_matches_viewport_corners() {
        let rect = viewport();
        assert_eq!(screen_to_ndc(Vec2::new(400.0, 300.0), rect), Some(Vec2::ZERO));
        assert_eq!(screen_to_ndc(Vec2::new(0.0, 0.0), rect), Some(Vec2::new(-1.0, 1.0)));
        assert_eq!(
            screen_to_ndc(Vec2::new(800.0, 600.0), rect),
            Some(Vec2::new(1.0, -1.0))
        );
    }

    #[test]
    fn ndc_respects_viewport_offset() {
        let rect = Rect::new(100.0, 50.0, 300.0, 150.0);
        assert_eq!(screen_to_ndc(Vec2::new(200.0, 100.0), rect), Some(Vec2::ZERO));
        assert_eq!(screen_to_ndc(Vec2::new(50.0, 100.0), rect), None);
    }

    #[test]
    fn click_hits_nearest_surface() {
        let mut scene = HeightfieldScene::new()
            .with_surface(|_, _| 1.0)
            .with_surface(|_, _| 4.0);
        let projector = TopDown { extent: 10.0 };
        let context = ClickContext {
            cursor: Vec2::new(600.0, 300.0),
            viewport: viewport(),
            projector: &projector,
        };

        assert_eq!(handle_click(&context, &mut scene), Ok(Vec3::new(5.0, 0.0, 4.0)));
    }

    #[test]
    fn click_errors_are_classified() {
        let mut empty = HeightfieldScene::new();
        let projector = TopDown { extent: 10.0 };

        let miss = ClickContext {
            cursor: Vec2::new(10.0, 10.0),
            viewport: viewport(),
            projector: &projector,
        };
        assert_eq!(
            handle_click(&miss, &mut empty),
            Err(ProfileError::NoIntersection)
        );

        let outside = ClickContext {
            cursor: Vec2::new(-5.0, 10.0),
            viewport: viewport(),
            projector: &projector,
        };
        assert_eq!(
            handle_click(&outside, &mut empty),
            Err(ProfileError::OutsideRenderSurface)
        );
    }

    #[test]
    fn enable_and_disable_are_idempotent() {
        let mut caster = PointerRayCaster::default();
        let mut sampler = LineSampler::default();
        let settings = ProfileSettings::default();

        assert!(caster.enable(&mut sampler));
        sampler.push(Vec3::ZERO, &settings.sampling);
        assert_eq!(sampler.buffered(), 1);

        // A second enable changes nothing, including the buffered pick.
        assert!(!caster.enable(&mut sampler));
        assert_eq!(sampler.buffered(), 1);

        assert!(caster.disable(&mut sampler));
        assert_eq!(sampler.buffered(), 0);
        assert!(!caster.disable(&mut sampler));
        assert!(!caster.is_enabled());
    }

    #[test]
    fn toggle_flips_and_clears_buffer() {
        let mut caster = PointerRayCaster::default();
        let mut sampler = LineSampler::default();
        let settings = ProfileSettings::default();

        assert!(caster.toggle(&mut sampler));
        sampler.push(Vec3::ONE, &settings.sampling);
        assert!(!caster.toggle(&mut sampler));
        assert_eq!(sampler.buffered(), 0);
    }

    fn pick_app() -> App {
        let mut app = App::new();
        app.add_event::<WorldPointPicked>()
            .init_resource::<Assets<Mesh>>()
            .init_resource::<Assets<StandardMaterial>>()
            .init_resource::<LineSampler>()
            .init_resource::<PendingResolutions>()
            .init_resource::<WebRpcInterface>()
            .insert_resource(ProfileSettings::default())
            .add_systems(Update, line_pick_system);
        app
    }

    fn pick(app: &mut App, point: Vec3) {
        app.world_mut().send_event(WorldPointPicked(point));
        app.update();
    }

    fn count<C: Component>(app: &mut App) -> usize {
        let world = app.world_mut();
        world.query_filtered::<(), With<C>>().iter(world).count()
    }

    fn last_notification(app: &App) -> Option<(String, serde_json::Value)> {
        app.world()
            .resource::<WebRpcInterface>()
            .pending_notifications()
            .last()
            .map(|n| (n.method.clone(), n.params.clone()))
    }

    #[test]
    fn completed_pair_draws_segment_and_queues_resolution() {
        let mut app = pick_app();

        pick(&mut app, Vec3::ZERO);
        assert_eq!(count::<FirstPickMarker>(&mut app), 1);
        assert_eq!(count::<LineSegmentOverlay>(&mut app), 0);

        pick(&mut app, Vec3::new(2.0, 1.0, 0.0));
        assert_eq!(count::<FirstPickMarker>(&mut app), 0);
        assert_eq!(count::<LineSegmentOverlay>(&mut app), 1);
        assert_eq!(app.world().resource::<PendingResolutions>().len(), 1);

        let (method, params) = last_notification(&app).expect("notification sent");
        assert_eq!(method, "line_sampled");
        assert_eq!(params["points"].as_array().map(Vec::len), Some(5));
    }

    #[test]
    fn too_close_pair_leaves_no_overlay_and_queues_nothing() {
        let mut app = pick_app();

        pick(&mut app, Vec3::ZERO);
        pick(&mut app, Vec3::new(0.05, 0.05, 0.0));

        assert_eq!(count::<FirstPickMarker>(&mut app), 0);
        assert_eq!(count::<LineSegmentOverlay>(&mut app), 0);
        assert!(app.world().resource::<PendingResolutions>().is_empty());

        let (method, params) = last_notification(&app).expect("notification sent");
        assert_eq!(method, "line_pick_aborted");
        assert_eq!(params["reason"], "point_pair_too_close");
    }

    #[test]
    fn vertical_pair_draws_segment_but_queues_nothing() {
        let mut app = pick_app();

        pick(&mut app, Vec3::new(1.0, 0.0, 0.0));
        pick(&mut app, Vec3::new(1.0, 3.0, 0.0));

        assert_eq!(count::<FirstPickMarker>(&mut app), 0);
        assert_eq!(count::<LineSegmentOverlay>(&mut app), 1);
        assert!(app.world().resource::<PendingResolutions>().is_empty());

        let (_, params) = last_notification(&app).expect("notification sent");
        assert_eq!(params["reason"], "degenerate_vertical");
    }

    #[test]
    fn pair_in_one_frame_leaves_no_marker() {
        let mut app = pick_app();

        app.world_mut().send_event(WorldPointPicked(Vec3::ZERO));
        app.world_mut()
            .send_event(WorldPointPicked(Vec3::new(2.0, 1.0, 0.0)));
        app.update();

        assert_eq!(count::<FirstPickMarker>(&mut app), 0);
        assert_eq!(count::<LineSegmentOverlay>(&mut app), 1);
        assert_eq!(app.world().resource::<PendingResolutions>().len(), 1);
    }

    #[test]
    fn hovered_chart_panel_captures_clicks() {
        use crate::tools::profile_chart::ProfileChart;

        let mut app = App::new();
        app.add_event::<WorldPointPicked>()
            .init_resource::<Assets<Mesh>>()
            .init_resource::<ButtonInput<MouseButton>>()
            .add_systems(Update, pointer_click_system);
        let panel = app
            .world_mut()
            .spawn((ProfileChart { index: 0 }, Interaction::Hovered))
            .id();

        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
        app.update();
        assert!(app.world().resource::<Events<WorldPointPicked>>().is_empty());

        let mut interactions = app.world_mut().query::<&Interaction>();
        assert!(ui_captures_pointer(interactions.iter(app.world())));

        app.world_mut().entity_mut(panel).insert(Interaction::None);
        let mut interactions = app.world_mut().query::<&Interaction>();
        assert!(!ui_captures_pointer(interactions.iter(app.world())));
    }
}
