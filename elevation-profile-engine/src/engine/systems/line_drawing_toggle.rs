use bevy::prelude::*;

use crate::tools::tool_manager::{
    LineDrawingAction, LineDrawingCommand, LineDrawingStateChanged, ToolSelectionSource,
};

const IDLE_COLOUR: Color = Color::srgb(0.22, 0.24, 0.28);
const HOVER_COLOUR: Color = Color::srgb(0.26, 0.28, 0.32);
const PRESSED_COLOUR: Color = Color::srgb(0.18, 0.20, 0.24);
const ACTIVE_COLOUR: Color = Color::srgb(0.0, 0.65, 0.0);

#[derive(Component)]
pub struct LineDrawingButton;

#[derive(Component)]
pub struct LineDrawingLabel;

/// Button in the top-right corner that toggles line drawing.
pub fn spawn_line_drawing_toggle(commands: &mut Commands) {
    commands
        .spawn((
            LineDrawingButton,
            Button,
            Name::new("LineDrawingButton"),
            BackgroundColor(IDLE_COLOUR),
            BorderColor(Color::srgba(0.0, 0.0, 0.0, 0.25)),
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(12.0),
                right: Val::Px(12.0),
                padding: UiRect::axes(Val::Px(12.0), Val::Px(6.0)),
                border: UiRect::all(Val::Px(1.0)),
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                ..default()
            },
        ))
        .with_children(|button| {
            button.spawn((
                LineDrawingLabel,
                Text::new(label_text(false)),
                TextFont {
                    font_size: 16.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

fn label_text(enabled: bool) -> &'static str {
    if enabled {
        "Line drawing: ON (L)"
    } else {
        "Line drawing: OFF (L)"
    }
}

// Pressing the button requests a toggle; the label waits for the state change.
pub fn line_drawing_button_interaction(
    mut q: Query<
        (&Interaction, &mut BackgroundColor),
        (Changed<Interaction>, With<Button>, With<LineDrawingButton>),
    >,
    mut tool_events: EventWriter<LineDrawingCommand>,
) {
    for (interaction, mut bg) in &mut q {
        match *interaction {
            Interaction::Pressed => {
                tool_events.write(LineDrawingCommand {
                    action: LineDrawingAction::Toggle,
                    source: ToolSelectionSource::Ui,
                });
                *bg = BackgroundColor(PRESSED_COLOUR);
            }
            Interaction::Hovered => *bg = BackgroundColor(HOVER_COLOUR),
            Interaction::None => *bg = BackgroundColor(IDLE_COLOUR),
        }
    }
}

/// Reflect the current state on the button, whatever source changed it.
pub fn update_line_drawing_label(
    mut events: EventReader<LineDrawingStateChanged>,
    mut labels: Query<&mut Text, With<LineDrawingLabel>>,
    mut buttons: Query<&mut BorderColor, With<LineDrawingButton>>,
) {
    let Some(latest) = events.read().last() else {
        return;
    };

    for mut text in &mut labels {
        text.0 = label_text(latest.enabled).to_string();
    }
    for mut border in &mut buttons {
        *border = if latest.enabled {
            BorderColor(ACTIVE_COLOUR)
        } else {
            BorderColor(Color::srgba(0.0, 0.0, 0.0, 0.25))
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_follows_state_changes() {
        let mut app = App::new();
        app.add_event::<LineDrawingStateChanged>()
            .add_systems(Update, update_line_drawing_label);
        let label = app
            .world_mut()
            .spawn((LineDrawingLabel, Text::new(label_text(false))))
            .id();

        app.world_mut().send_event(LineDrawingStateChanged {
            enabled: true,
            source: ToolSelectionSource::Keyboard,
        });
        app.update();

        let text = app.world().get::<Text>(label).map(|t| t.0.clone());
        assert_eq!(text.as_deref(), Some("Line drawing: ON (L)"));
    }
}
