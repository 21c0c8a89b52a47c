//! 2D elevation chart rendered with Bevy UI nodes.
//!
//! Every resolved profile gets its own chart panel. Panels stack in a column
//! and are never cleared, so repeated profiles accumulate on screen.

use bevy::prelude::*;
use bevy::ui::FocusPolicy;
use constants::render_settings::{
    CHART_LINE_WIDTH, CHART_MARKER_SIZE, CHART_STACK_GAP, CURVE_COLOUR,
};

use crate::engine::assets::profile_settings::{ChartSettings, ProfileSettings};
use crate::engine::scene::raycast::ProfileOverlay;
use crate::tools::elevation_resolver::{ElevationProfileResolved, ElevationSample};

/// (horizontal, elevation) pairs in profile order.
pub fn profile_series(samples: &[ElevationSample]) -> Vec<Vec2> {
    samples.iter().map(|s| Vec2::new(s.x, s.z)).collect()
}

/// Maps series values into panel pixels. Origin is the panel's top-left
/// corner; x grows right and elevation grows up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartLayout {
    pub min: Vec2,
    pub max: Vec2,
    pub size: Vec2,
    pub padding: f32,
}

impl ChartLayout {
    /// Fit the panel to the series bounds. `None` for an empty series.
    pub fn fit(series: &[Vec2], settings: &ChartSettings) -> Option<Self> {
        let first = *series.first()?;
        let (mut min, mut max) = series
            .iter()
            .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p)));

        // A flat profile or a single column still needs a drawable range.
        for axis in 0..2 {
            if max[axis] - min[axis] < f32::EPSILON {
                min[axis] -= 0.5;
                max[axis] += 0.5;
            }
        }

        Some(Self {
            min,
            max,
            size: Vec2::new(settings.width, settings.height),
            padding: settings.padding,
        })
    }

    pub fn project(&self, point: Vec2) -> Vec2 {
        let inner = (self.size - Vec2::splat(2.0 * self.padding)).max(Vec2::ZERO);
        let t = (point - self.min) / (self.max - self.min);
        Vec2::new(
            self.padding + t.x * inner.x,
            self.padding + (1.0 - t.y) * inner.y,
        )
    }
}

/// Column holding every chart panel.
#[derive(Component)]
pub struct ProfileChartStack;

/// One chart panel.
#[derive(Component)]
pub struct ProfileChart {
    pub index: usize,
}

#[derive(Component)]
pub struct ChartMarker;

#[derive(Component)]
pub struct ChartConnector;

/// Spawn a new chart panel for every resolved profile with at least 2 samples.
pub fn spawn_profile_charts(
    mut commands: Commands,
    mut events: EventReader<ElevationProfileResolved>,
    stacks: Query<Entity, With<ProfileChartStack>>,
    charts: Query<(), With<ProfileChart>>,
    settings: Res<ProfileSettings>,
) {
    let mut stack = stacks.iter().next();
    let mut index = charts.iter().count();

    for event in events.read() {
        if event.samples.len() < 2 {
            continue;
        }
        let series = profile_series(&event.samples);
        let Some(layout) = ChartLayout::fit(&series, &settings.chart) else {
            continue;
        };

        let parent = *stack.get_or_insert_with(|| spawn_chart_stack(&mut commands));
        let chart = spawn_chart_panel(&mut commands, &layout, &series, index);
        commands.entity(parent).add_child(chart);

        debug!("Profile chart {} spawned with {} points", index, series.len());
        index += 1;
    }
}

fn spawn_chart_stack(commands: &mut Commands) -> Entity {
    commands
        .spawn((
            Node {
                position_type: PositionType::Absolute,
                top: Val::Px(12.0),
                left: Val::Px(12.0),
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(CHART_STACK_GAP),
                ..default()
            },
            ProfileChartStack,
            Name::new("Profile charts"),
        ))
        .id()
}

fn spawn_chart_panel(
    commands: &mut Commands,
    layout: &ChartLayout,
    series: &[Vec2],
    index: usize,
) -> Entity {
    let points: Vec<Vec2> = series.iter().map(|p| layout.project(*p)).collect();

    commands
        .spawn((
            Node {
                width: Val::Px(layout.size.x),
                height: Val::Px(layout.size.y),
                position_type: PositionType::Relative,
                ..default()
            },
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.6)),
            // Panels swallow clicks so the terrain behind them is never picked.
            Interaction::default(),
            FocusPolicy::Block,
            ProfileChart { index },
            ProfileOverlay,
            Name::new(format!("Profile chart {index}")),
        ))
        .with_children(|panel| {
            for pair in points.windows(2) {
                let (a, b) = (pair[0], pair[1]);
                let delta = b - a;
                let length = delta.length();
                let midpoint = (a + b) * 0.5;
                panel.spawn((
                    Node {
                        position_type: PositionType::Absolute,
                        left: Val::Px(midpoint.x - length * 0.5),
                        top: Val::Px(midpoint.y - CHART_LINE_WIDTH * 0.5),
                        width: Val::Px(length),
                        height: Val::Px(CHART_LINE_WIDTH),
                        ..default()
                    },
                    Transform::from_rotation(Quat::from_rotation_z(delta.y.atan2(delta.x))),
                    BackgroundColor(CURVE_COLOUR),
                    ChartConnector,
                ));
            }

            for point in &points {
                panel.spawn((
                    Node {
                        position_type: PositionType::Absolute,
                        left: Val::Px(point.x - CHART_MARKER_SIZE * 0.5),
                        top: Val::Px(point.y - CHART_MARKER_SIZE * 0.5),
                        width: Val::Px(CHART_MARKER_SIZE),
                        height: Val::Px(CHART_MARKER_SIZE),
                        ..default()
                    },
                    BorderRadius::MAX,
                    BackgroundColor(Color::WHITE),
                    ChartMarker,
                ));
            }
        })
        .id()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(x: f32, z: f32) -> ElevationSample {
        ElevationSample { x, y: 0.0, z }
    }

    #[test]
    fn layout_maps_extremes_to_padded_edges() {
        let settings = ChartSettings {
            width: 200.0,
            height: 100.0,
            padding: 10.0,
        };
        let series = [Vec2::new(0.0, -1.0), Vec2::new(2.0, 1.0)];
        let layout = ChartLayout::fit(&series, &settings).unwrap();

        assert_eq!(layout.project(series[0]), Vec2::new(10.0, 90.0));
        assert_eq!(layout.project(series[1]), Vec2::new(190.0, 10.0));
    }

    #[test]
    fn flat_profile_is_centred_vertically() {
        let settings = ChartSettings {
            width: 100.0,
            height: 100.0,
            padding: 0.0,
        };
        let series = [Vec2::new(0.0, 3.0), Vec2::new(1.0, 3.0)];
        let layout = ChartLayout::fit(&series, &settings).unwrap();

        assert_eq!(layout.project(series[0]).y, 50.0);
        assert!(ChartLayout::fit(&[], &settings).is_none());
    }

    #[test]
    fn series_pairs_x_with_elevation() {
        let series = profile_series(&[sample(0.5, -1.0), sample(1.0, -2.0)]);
        assert_eq!(series, vec![Vec2::new(0.5, -1.0), Vec2::new(1.0, -2.0)]);
    }

    #[test]
    fn charts_accumulate_per_profile() {
        let mut app = App::new();
        app.add_event::<ElevationProfileResolved>()
            .insert_resource(ProfileSettings::default())
            .add_systems(Update, spawn_profile_charts);

        let samples = vec![sample(0.0, 0.0), sample(0.5, 0.2), sample(1.0, -0.1)];
        for _ in 0..2 {
            app.world_mut().send_event(ElevationProfileResolved {
                samples: samples.clone(),
            });
            app.update();
        }
        // Too short to chart.
        app.world_mut().send_event(ElevationProfileResolved {
            samples: vec![sample(0.0, 0.0)],
        });
        app.update();

        let world = app.world_mut();
        assert_eq!(world.query::<&ProfileChart>().iter(world).count(), 2);
        assert_eq!(world.query::<&ProfileChartStack>().iter(world).count(), 1);
        assert_eq!(world.query::<&ChartMarker>().iter(world).count(), 6);
        assert_eq!(world.query::<&ChartConnector>().iter(world).count(), 4);
    }

    #[test]
    fn chart_panels_block_pointer_input() {
        let mut app = App::new();
        app.add_event::<ElevationProfileResolved>()
            .insert_resource(ProfileSettings::default())
            .add_systems(Update, spawn_profile_charts);

        app.world_mut().send_event(ElevationProfileResolved {
            samples: vec![sample(0.0, 0.0), sample(1.0, 0.5)],
        });
        app.update();

        let world = app.world_mut();
        let mut panels = world.query_filtered::<(&Interaction, &FocusPolicy), With<ProfileChart>>();
        let (interaction, focus) = panels.single(world).expect("one chart panel");
        assert_eq!(*interaction, Interaction::None);
        assert_eq!(*focus, FocusPolicy::Block);
    }
}
