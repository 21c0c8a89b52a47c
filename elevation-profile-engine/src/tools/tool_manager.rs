use bevy::prelude::*;

use crate::rpc::web_rpc::WebRpcInterface;
use crate::tools::line_sampler::LineSampler;
use crate::tools::pointer_ray::{FirstPickMarker, PointerRayCaster, clear_pick_markers};

/// Requested change to the line drawing tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDrawingAction {
    Enable,
    Disable,
    Toggle,
    Set(bool),
}

/// Source of a tool command for debugging and conditional logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolSelectionSource {
    Rpc,
    Keyboard,
    Ui,
}

/// Command channel for enabling and disabling line drawing.
#[derive(Event, Debug, Clone, Copy)]
pub struct LineDrawingCommand {
    pub action: LineDrawingAction,
    pub source: ToolSelectionSource,
}

/// Fired only when the enabled state actually changes.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineDrawingStateChanged {
    pub enabled: bool,
    pub source: ToolSelectionSource,
}

/// Apply line drawing commands to the click listener.
pub fn handle_line_drawing_commands(
    mut commands: Commands,
    mut events: EventReader<LineDrawingCommand>,
    mut caster: ResMut<PointerRayCaster>,
    mut sampler: ResMut<LineSampler>,
    markers: Query<Entity, With<FirstPickMarker>>,
    mut changed: EventWriter<LineDrawingStateChanged>,
) {
    for event in events.read() {
        let was_enabled = caster.is_enabled();

        let enable = match event.action {
            LineDrawingAction::Enable => true,
            LineDrawingAction::Disable => false,
            LineDrawingAction::Toggle => !was_enabled,
            LineDrawingAction::Set(enabled) => enabled,
        };

        let transitioned = if enable {
            caster.enable(&mut sampler)
        } else {
            caster.disable(&mut sampler)
        };

        if !transitioned {
            debug!(
                "Line drawing already {} ({:?})",
                if enable { "enabled" } else { "disabled" },
                event.source
            );
            continue;
        }

        // Any half-finished pick was dropped by the transition.
        clear_pick_markers(&mut commands, &markers);

        info!(
            "Line drawing {} via {:?}",
            if enable { "enabled" } else { "disabled" },
            event.source
        );
        changed.write(LineDrawingStateChanged {
            enabled: enable,
            source: event.source,
        });
    }
}

/// Forward state changes to the frontend.
pub fn notify_line_drawing_changed(
    mut events: EventReader<LineDrawingStateChanged>,
    mut rpc_interface: ResMut<WebRpcInterface>,
) {
    for event in events.read() {
        rpc_interface.send_notification(
            "line_drawing_changed",
            serde_json::json!({ "enabled": event.enabled }),
        );
    }
}

/// System handling keyboard shortcuts for line drawing (native builds only).
#[cfg(not(target_arch = "wasm32"))]
pub fn handle_tool_keyboard_shortcuts(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut tool_events: EventWriter<LineDrawingCommand>,
) {
    if keyboard.just_pressed(KeyCode::KeyL) {
        tool_events.write(LineDrawingCommand {
            action: LineDrawingAction::Toggle,
            source: ToolSelectionSource::Keyboard,
        });
    }

    if keyboard.just_pressed(KeyCode::Escape) {
        tool_events.write(LineDrawingCommand {
            action: LineDrawingAction::Disable,
            source: ToolSelectionSource::Keyboard,
        });
    }
}

/// Placeholder system for WASM builds where keyboard shortcuts are disabled.
#[cfg(target_arch = "wasm32")]
pub fn handle_tool_keyboard_shortcuts() {
    // No keyboard shortcuts in WASM builds - line drawing controlled via RPC only.
}
