use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use constants::coordinate_system::UP_AXIS;

/// Orbit camera state around a focus point on the X/Y plane.
#[derive(Resource, Debug, Clone)]
pub struct ViewportCamera {
    pub focus_point: Vec3,
    pub distance: f32,
    /// Rotation around the up axis, radians.
    pub yaw: f32,
    /// Elevation above the X/Y plane, radians.
    pub pitch: f32,
}

impl Default for ViewportCamera {
    fn default() -> Self {
        Self {
            focus_point: Vec3::ZERO,
            distance: 12.0,
            yaw: -std::f32::consts::FRAC_PI_2,
            pitch: 0.8,
        }
    }
}

impl ViewportCamera {
    /// Frame a square terrain of side `size` centred on the origin.
    pub fn framing(size: f32) -> Self {
        Self {
            distance: size * 1.4,
            ..default()
        }
    }

    /// Camera position for the current orbit.
    pub fn eye(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.focus_point
            + self.distance * Vec3::new(cos_pitch * cos_yaw, cos_pitch * sin_yaw, sin_pitch)
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.eye()).looking_at(self.focus_point, UP_AXIS)
    }
}

/// Right-drag orbits, scroll zooms, WASD pans across the X/Y plane.
pub fn camera_controller(
    mut camera_query: Query<&mut Transform, With<Camera3d>>,
    mut viewport_camera: ResMut<ViewportCamera>,
    mouse_button: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: EventReader<MouseMotion>,
    mut scroll_events: EventReader<MouseWheel>,
    keyboard: Res<ButtonInput<KeyCode>>,
    time: Res<Time>,
) {
    let Ok(mut camera_transform) = camera_query.single_mut() else {
        return;
    };

    let mouse_delta: Vec2 = mouse_motion.read().map(|m| m.delta).sum();
    if mouse_button.pressed(MouseButton::Right) && mouse_delta != Vec2::ZERO {
        let yaw_sens = 0.0035;
        let pitch_sens = 0.0030;
        viewport_camera.yaw -= mouse_delta.x * yaw_sens;
        viewport_camera.pitch = (viewport_camera.pitch + mouse_delta.y * pitch_sens).clamp(0.05, 1.55);
    }

    let mut scroll_accum = 0.0;
    for ev in scroll_events.read() {
        scroll_accum += match ev.unit {
            MouseScrollUnit::Line => ev.y,
            MouseScrollUnit::Pixel => ev.y * 0.05,
        };
    }
    if scroll_accum.abs() > f32::EPSILON {
        let zoom = (1.0 - scroll_accum * 0.1).clamp(0.5, 1.5);
        viewport_camera.distance = (viewport_camera.distance * zoom).clamp(0.5, 500.0);
    }

    // Keyboard pan, ignored on wasm where the page owns the keyboard.
    #[cfg(not(target_arch = "wasm32"))]
    {
        let mut move_input = Vec2::ZERO;
        if keyboard.pressed(KeyCode::KeyW) {
            move_input.y += 1.0;
        }
        if keyboard.pressed(KeyCode::KeyS) {
            move_input.y -= 1.0;
        }
        if keyboard.pressed(KeyCode::KeyD) {
            move_input.x += 1.0;
        }
        if keyboard.pressed(KeyCode::KeyA) {
            move_input.x -= 1.0;
        }

        if move_input != Vec2::ZERO {
            let (sin_yaw, cos_yaw) = viewport_camera.yaw.sin_cos();
            // Forward points from the eye toward the focus, flattened.
            let forward = -Vec3::new(cos_yaw, sin_yaw, 0.0);
            let right = forward.cross(UP_AXIS);

            let mut speed = (viewport_camera.distance * 0.5).clamp(1.0, 100.0);
            if keyboard.any_pressed([KeyCode::ShiftLeft, KeyCode::ShiftRight]) {
                speed *= 3.5;
            }

            let world_delta = right * move_input.x + forward * move_input.y;
            viewport_camera.focus_point += world_delta.normalize() * speed * time.delta_secs();
        }
    }
    #[cfg(target_arch = "wasm32")]
    let _ = (&keyboard, &time);

    let target = viewport_camera.transform();
    camera_transform.translation = target.translation;
    camera_transform.rotation = target.rotation;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn eye_orbits_above_the_plane() {
        let camera = ViewportCamera {
            focus_point: Vec3::new(1.0, 2.0, 0.0),
            distance: 10.0,
            yaw: 0.0,
            pitch: std::f32::consts::FRAC_PI_2,
        };
        let eye = camera.eye();
        assert!((eye - Vec3::new(1.0, 2.0, 10.0)).length() < 1e-4);
    }

    #[test]
    fn default_view_looks_down_toward_focus() {
        let camera = ViewportCamera::default();
        let transform = camera.transform();
        let forward = *transform.forward();
        assert!(forward.z < 0.0);
        assert!(camera.eye().z > 0.0);
    }
}
