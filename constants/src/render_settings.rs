use bevy::color::Color;

pub const DRAW_LINE_WIDTH: f32 = 0.02;
pub const PICK_MARKER_SIZE: f32 = 0.04;

pub const SEGMENT_COLOUR: Color = Color::WHITE;
pub const PICK_MARKER_COLOUR: Color = Color::srgb(1.0, 1.0, 0.2);
pub const CURVE_COLOUR: Color = Color::srgb(1.0, 0.27, 0.0);

/// Number of tessellated points per span between two elevation samples.
pub const CURVE_SEGMENTS_PER_SPAN: usize = 12;

/// Chart panel size in logical pixels.
pub const CHART_WIDTH: f32 = 360.0;
pub const CHART_HEIGHT: f32 = 180.0;
pub const CHART_PADDING: f32 = 16.0;
pub const CHART_MARKER_SIZE: f32 = 6.0;
pub const CHART_LINE_WIDTH: f32 = 2.0;

/// Vertical gap between stacked chart panels.
pub const CHART_STACK_GAP: f32 = 8.0;
