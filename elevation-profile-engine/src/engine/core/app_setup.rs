use bevy::asset::AssetMetaCheck;
use bevy::diagnostic::FrameTimeDiagnosticsPlugin;
use bevy::prelude::*;
use bevy::render::view::RenderLayers;
use bevy_common_assets::json::JsonAssetPlugin;
// Crate engine modules
use crate::engine::assets::profile_settings::ProfileSettings;
use crate::engine::camera::viewport_camera::{ViewportCamera, camera_controller};
use crate::engine::core::app_state::{AppState, transition_to_running, update_loading_frontend};
use crate::engine::core::window_config::create_window_config;
use crate::engine::loading::progress::LoadingProgress;
use crate::engine::loading::settings_loader::{SettingsLoader, load_settings_system, start_loading};
use crate::engine::scene::terrain::{mark_model_meshes, spawn_demo_terrain, spawn_model};
use crate::engine::systems::fps_tracking::fps_notification_system;
// Crate tools modules
use crate::tools::{
    curve_builder::build_elevation_curve,
    elevation_resolver::{
        ElevationProfile, ElevationProfileResolved, PendingResolutions, resolve_due_profiles,
    },
    line_sampler::LineSampler,
    pointer_ray::{
        PointerRayCaster, WorldPointPicked, line_drawing_enabled, line_pick_system,
        pointer_click_system,
    },
    profile_chart::spawn_profile_charts,
    tool_manager::{
        LineDrawingCommand, LineDrawingStateChanged, handle_line_drawing_commands,
        handle_tool_keyboard_shortcuts, notify_line_drawing_changed,
    },
};
// Create Web RPC modules
use crate::rpc::web_rpc::WebRpcPlugin;

#[cfg(not(target_arch = "wasm32"))]
use crate::engine::core::app_state::FpsText;
#[cfg(not(target_arch = "wasm32"))]
use crate::engine::systems::{
    fps_tracking::fps_text_update_system,
    line_drawing_toggle::{
        line_drawing_button_interaction, spawn_line_drawing_toggle, update_line_drawing_label,
    },
};

pub fn create_app() -> App {
    let mut app = App::new();

    app.add_plugins(create_default_plugins())
        .init_state::<AppState>()
        .add_plugins(FrameTimeDiagnosticsPlugin::default())
        // Registers ProfileSettings as a loadable asset type from JSON files.
        .add_plugins(JsonAssetPlugin::<ProfileSettings>::new(&["profile.json"]))
        .add_plugins(WebRpcPlugin)
        // Defaults stay in force until the settings file resolves.
        .insert_resource(ProfileSettings::default());

    // Initialise resources early
    app.init_resource::<LoadingProgress>()
        .init_resource::<SettingsLoader>()
        .init_resource::<PointerRayCaster>()
        .init_resource::<LineSampler>()
        .init_resource::<PendingResolutions>()
        .init_resource::<ElevationProfile>()
        .init_resource::<ViewportCamera>()
        .add_event::<LineDrawingCommand>()
        .add_event::<LineDrawingStateChanged>()
        .add_event::<WorldPointPicked>()
        .add_event::<ElevationProfileResolved>();

    // State-based system scheduling
    app.add_systems(Startup, (setup, start_loading).chain())
        .add_systems(
            Update,
            (
                // Loading phase systems
                load_settings_system,
                transition_to_running,
                update_loading_frontend,
            )
                .chain()
                .run_if(in_state(AppState::Loading)),
        )
        .add_systems(OnEnter(AppState::Running), spawn_scene);

    // Runtime systems, ordered so one frame carries a click through to its overlays.
    let line_drawing_systems = (
        handle_tool_keyboard_shortcuts, // Native shortcuts or no-op for WASM
        handle_line_drawing_commands,
        notify_line_drawing_changed,
        pointer_click_system.run_if(line_drawing_enabled),
        line_pick_system,
        resolve_due_profiles,
        build_elevation_curve,
        spawn_profile_charts,
    )
        .chain();

    let runtime_systems = (
        camera_controller,
        mark_model_meshes,
        fps_notification_system,
        update_loading_frontend,
    );

    app.add_systems(
        Update,
        (line_drawing_systems, runtime_systems).run_if(in_state(AppState::Running)),
    );

    // Native-only overlays.
    #[cfg(not(target_arch = "wasm32"))]
    {
        app.add_systems(
            Update,
            (
                fps_text_update_system,
                line_drawing_button_interaction
                    .before(handle_line_drawing_commands)
                    .run_if(in_state(AppState::Running)),
                update_line_drawing_label.after(handle_line_drawing_commands),
            ),
        );
    }

    app
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            illuminance: 8_000.0,
            ..default()
        },
        // Sun from the south-west, tilted down toward the X/Y plane.
        Transform::from_xyz(-4.0, -6.0, 10.0).looking_at(Vec3::ZERO, Vec3::Z),
    ));
}

fn create_viewport_camera(commands: &mut Commands, viewport_camera: &ViewportCamera) {
    commands.spawn((
        Camera3d::default(),
        viewport_camera.transform(),
        // Layer 1 carries the profile overlays.
        RenderLayers::default().with(1),
    ));
}

// Startup system that only handles basic initialisation
fn setup(mut commands: Commands, viewport_camera: Res<ViewportCamera>) {
    spawn_lighting(&mut commands);
    create_viewport_camera(&mut commands, &viewport_camera);

    #[cfg(not(target_arch = "wasm32"))]
    {
        create_native_overlays(&mut commands);
        spawn_line_drawing_toggle(&mut commands);
    }
}

/// Build the scene once settings are known.
fn spawn_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
    settings: Res<ProfileSettings>,
    mut viewport_camera: ResMut<ViewportCamera>,
    mut loading_progress: ResMut<LoadingProgress>,
) {
    spawn_demo_terrain(&mut commands, &mut meshes, &mut materials, &settings.scene);
    if let Some(path) = &settings.scene.model_path {
        spawn_model(&mut commands, &asset_server, path);
    }

    *viewport_camera = ViewportCamera::framing(settings.scene.terrain_size);
    loading_progress.scene_spawned = true;
}

#[cfg(not(target_arch = "wasm32"))]
fn create_native_overlays(commands: &mut Commands) {
    commands
        .spawn(Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        })
        .with_children(|parent| {
            parent.spawn((
                Text::new("FPS: "),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::srgb(1., 0., 0.)),
                Node {
                    position_type: PositionType::Absolute,
                    bottom: Val::Px(12.0),
                    right: Val::Px(12.0),
                    ..default()
                },
                FpsText,
            ));
        });
}

fn create_default_plugins() -> impl PluginGroup {
    let window_config = WindowPlugin {
        primary_window: Some(create_window_config()),
        ..default()
    };

    let asset_config = AssetPlugin {
        meta_check: AssetMetaCheck::Never,
        ..default()
    };

    DefaultPlugins.set(window_config).set(asset_config)
}
