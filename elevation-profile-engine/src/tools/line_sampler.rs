//! Two-point pick buffer and adaptive sampling along the picked line.
//!
//! A pick pair is sampled by marching along X from the first point toward the
//! second. The step is coarse for long lines and fine for short ones, and every
//! sampled coordinate is rounded to a fixed number of decimals. The resulting
//! sequence always starts with the first pick and ends with the second.

use bevy::prelude::*;
use constants::coordinate_system::to_sampling_plane;
use constants::sampling::{MAX_COORDINATE_DECIMALS, MAX_SAMPLES_PER_LINE, round_to};
use serde::{Deserialize, Serialize};

use crate::engine::assets::profile_settings::SamplingSettings;
use crate::tools::profile_error::ProfileError;

/// Absorbs f32 step widening when comparing the remaining run to half a step.
const STEP_EPSILON: f64 = 1e-6;

/// Horizontal-plane coordinate produced by the sampler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampledPoint {
    pub x: f32,
    pub y: f32,
}

impl SampledPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn rounded(x: f64, y: f64, decimals: u32) -> Self {
        Self {
            x: round_to(x, decimals) as f32,
            y: round_to(y, decimals) as f32,
        }
    }
}

/// Straight segment between the two picks, drawn as feedback.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineSegment {
    pub start: Vec3,
    pub end: Vec3,
}

/// Pick buffer state. Never holds more than one point between clicks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PickState {
    #[default]
    Idle,
    OnePicked(Vec3),
}

/// Result of feeding one world point into the sampler.
#[derive(Debug, Clone, PartialEq)]
pub enum PickOutcome {
    /// First point stored, waiting for the second.
    Started(Vec3),
    /// Pair accepted and sampled.
    Completed {
        segment: LineSegment,
        points: Vec<SampledPoint>,
    },
    /// Pair rejected. The segment is still drawn for an equal-x pair.
    Aborted {
        segment: Option<LineSegment>,
        reason: ProfileError,
    },
}

/// Stateful pick buffer plus the most recent sampled sequence.
#[derive(Resource, Debug, Default)]
pub struct LineSampler {
    state: PickState,
    points: Vec<SampledPoint>,
}

impl LineSampler {
    pub fn state(&self) -> PickState {
        self.state
    }

    /// Number of buffered picks, 0 or 1.
    pub fn buffered(&self) -> usize {
        match self.state {
            PickState::Idle => 0,
            PickState::OnePicked(_) => 1,
        }
    }

    /// Most recently computed sequence. Empty before the first completion and
    /// after an abort.
    pub fn points(&self) -> &[SampledPoint] {
        &self.points
    }

    /// Drop any buffered pick. The last sampled sequence is kept.
    pub fn reset(&mut self) {
        self.state = PickState::Idle;
    }

    /// Advance the state machine with a new picked point.
    pub fn push(&mut self, point: Vec3, settings: &SamplingSettings) -> PickOutcome {
        match self.state {
            PickState::Idle => {
                self.state = PickState::OnePicked(point);
                PickOutcome::Started(point)
            }
            PickState::OnePicked(first) => {
                // Back to Idle regardless of how the pair is judged.
                self.state = PickState::Idle;
                match sample_line(first, point, settings) {
                    Ok(points) => {
                        self.points = points.clone();
                        PickOutcome::Completed {
                            segment: LineSegment {
                                start: first,
                                end: point,
                            },
                            points,
                        }
                    }
                    Err(reason) => {
                        self.points.clear();
                        // Only an equal-x pair is a drawable line.
                        let segment = match reason {
                            ProfileError::DegenerateVertical { .. } => Some(LineSegment {
                                start: first,
                                end: point,
                            }),
                            _ => None,
                        };
                        PickOutcome::Aborted { segment, reason }
                    }
                }
            }
        }
    }
}

/// Sample the line from `p1` to `p2` in the horizontal plane.
pub fn sample_line(
    p1: Vec3,
    p2: Vec3,
    settings: &SamplingSettings,
) -> Result<Vec<SampledPoint>, ProfileError> {
    let distance = p1.distance(p2);
    if distance < settings.min_pick_distance {
        return Err(ProfileError::PointPairTooClose {
            distance,
            minimum: settings.min_pick_distance,
        });
    }

    let (x1, y1) = to_sampling_plane(p1);
    let (x2, y2) = to_sampling_plane(p2);
    if x2 - x1 == 0.0 {
        return Err(ProfileError::DegenerateVertical { x: x1 });
    }

    let step_size = settings.step_for(distance);
    if !step_size.is_finite() || step_size <= 0.0 {
        return Err(ProfileError::InvalidSamplingStep { step: step_size });
    }

    let (x1, y1, x2, y2) = (x1 as f64, y1 as f64, x2 as f64, y2 as f64);
    let step_size = step_size as f64;
    // Interior points plus both endpoints.
    let required = ((x2 - x1).abs() / step_size).ceil() + 1.0;
    if !(required <= MAX_SAMPLES_PER_LINE as f64) {
        return Err(ProfileError::SampleLimitExceeded {
            required: required.min(usize::MAX as f64) as usize,
            limit: MAX_SAMPLES_PER_LINE,
        });
    }

    let decimals = settings.decimals.min(MAX_COORDINATE_DECIMALS);
    let slope = (y2 - y1) / (x2 - x1);
    let step = if x1 < x2 { step_size } else { -step_size };
    let direction = step.signum();
    let half_step = step_size / 2.0;

    let mut points = vec![SampledPoint::rounded(x1, y1, decimals)];

    // Positions are derived from the index so drift never accumulates.
    let mut i = 1u32;
    loop {
        let x = x1 + step * i as f64;
        let remaining = (x2 - x) * direction;
        if remaining < half_step - STEP_EPSILON {
            break;
        }
        let y = y1 + slope * (x - x1);
        points.push(SampledPoint::rounded(x, y, decimals));
        i += 1;
    }

    points.push(SampledPoint::rounded(x2, y2, decimals));
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> SamplingSettings {
        SamplingSettings::default()
    }

    fn xy(points: &[SampledPoint]) -> Vec<(f32, f32)> {
        points.iter().map(|p| (p.x, p.y)).collect()
    }

    #[test]
    fn long_line_uses_coarse_step() {
        let points = sample_line(Vec3::ZERO, Vec3::new(2.0, 1.0, 0.0), &settings()).unwrap();
        assert_eq!(
            xy(&points),
            vec![(0.0, 0.0), (0.5, 0.25), (1.0, 0.5), (1.5, 0.75), (2.0, 1.0)]
        );
    }

    #[test]
    fn short_line_uses_fine_step() {
        let points = sample_line(Vec3::ZERO, Vec3::new(0.5, 0.5, 0.0), &settings()).unwrap();
        assert_eq!(
            xy(&points),
            vec![(0.0, 0.0), (0.2, 0.2), (0.4, 0.4), (0.5, 0.5)]
        );
    }

    #[test]
    fn reversed_direction_marches_backwards() {
        let points = sample_line(Vec3::new(2.0, 1.0, 0.0), Vec3::ZERO, &settings()).unwrap();
        assert_eq!(
            xy(&points),
            vec![(2.0, 1.0), (1.5, 0.75), (1.0, 0.5), (0.5, 0.25), (0.0, 0.0)]
        );
    }

    #[test]
    fn endpoints_are_rounded_picks_and_interior_is_monotonic() {
        let cases = [
            (Vec3::new(0.123, -0.456, 1.0), Vec3::new(3.789, 2.001, -2.0)),
            (Vec3::new(5.5, 1.25, 0.0), Vec3::new(-1.337, 0.5, 0.0)),
            (Vec3::new(-0.31, 0.0, 0.0), Vec3::new(0.17, 0.9, 0.3)),
        ];
        for (p1, p2) in cases {
            let points = sample_line(p1, p2, &settings()).unwrap();
            let first = points.first().unwrap();
            let last = points.last().unwrap();
            assert_eq!(*first, SampledPoint::rounded(p1.x as f64, p1.y as f64, 2));
            assert_eq!(*last, SampledPoint::rounded(p2.x as f64, p2.y as f64, 2));

            let sign = (p2.x - p1.x).signum();
            for pair in points.windows(2) {
                assert!((pair[1].x - pair[0].x) * sign > 0.0, "{:?}", points);
            }
        }
    }

    #[test]
    fn pick_height_is_ignored_for_sampling() {
        let flat = sample_line(Vec3::ZERO, Vec3::new(2.0, 1.0, 0.0), &settings()).unwrap();
        let tilted =
            sample_line(Vec3::new(0.0, 0.0, 0.3), Vec3::new(2.0, 1.0, 0.3), &settings()).unwrap();
        assert_eq!(flat, tilted);
    }

    #[test]
    fn too_close_pair_aborts_without_segment() {
        let mut sampler = LineSampler::default();
        sampler.push(Vec3::ZERO, &settings());
        let outcome = sampler.push(Vec3::new(0.05, 0.05, 0.0), &settings());

        match outcome {
            PickOutcome::Aborted { segment, reason } => {
                assert!(segment.is_none());
                assert!(matches!(reason, ProfileError::PointPairTooClose { .. }));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(sampler.points().is_empty());
        assert_eq!(sampler.state(), PickState::Idle);
    }

    #[test]
    fn vertical_pair_aborts_after_drawing_segment() {
        let mut sampler = LineSampler::default();
        sampler.push(Vec3::new(1.0, 0.0, 0.0), &settings());
        let outcome = sampler.push(Vec3::new(1.0, 3.0, 0.0), &settings());

        match outcome {
            PickOutcome::Aborted { segment, reason } => {
                assert!(segment.is_some());
                assert_eq!(reason, ProfileError::DegenerateVertical { x: 1.0 });
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert!(sampler.points().is_empty());
        assert_eq!(sampler.buffered(), 0);
    }

    #[test]
    fn abort_clears_previous_sequence() {
        let mut sampler = LineSampler::default();
        sampler.push(Vec3::ZERO, &settings());
        sampler.push(Vec3::new(2.0, 1.0, 0.0), &settings());
        assert_eq!(sampler.points().len(), 5);

        sampler.push(Vec3::ZERO, &settings());
        sampler.push(Vec3::new(0.0, 0.01, 0.0), &settings());
        assert!(sampler.points().is_empty());
    }

    #[test]
    fn buffer_returns_to_idle_after_completion() {
        let mut sampler = LineSampler::default();
        assert!(sampler.points().is_empty());

        assert_eq!(
            sampler.push(Vec3::ZERO, &settings()),
            PickOutcome::Started(Vec3::ZERO)
        );
        assert_eq!(sampler.buffered(), 1);

        let outcome = sampler.push(Vec3::new(0.5, 0.5, 0.0), &settings());
        assert!(matches!(outcome, PickOutcome::Completed { .. }));
        assert_eq!(sampler.state(), PickState::Idle);
        assert_eq!(sampler.points().len(), 4);

        // The next click starts a fresh pair.
        assert!(matches!(
            sampler.push(Vec3::ONE, &settings()),
            PickOutcome::Started(_)
        ));
    }

    #[test]
    fn reset_discards_single_pick_only() {
        let mut sampler = LineSampler::default();
        sampler.push(Vec3::ZERO, &settings());
        sampler.push(Vec3::new(2.0, 1.0, 0.0), &settings());
        sampler.push(Vec3::ONE, &settings());

        sampler.reset();
        assert_eq!(sampler.state(), PickState::Idle);
        assert_eq!(sampler.points().len(), 5);
    }

    #[test]
    fn zero_step_aborts_instead_of_looping() {
        let mut zero_step = settings();
        zero_step.fine_step = 0.0;
        assert_eq!(
            sample_line(Vec3::ZERO, Vec3::new(0.5, 0.5, 0.0), &zero_step),
            Err(ProfileError::InvalidSamplingStep { step: 0.0 })
        );

        let mut nan_step = settings();
        nan_step.coarse_step = f32::NAN;
        assert!(matches!(
            sample_line(Vec3::ZERO, Vec3::new(2.0, 1.0, 0.0), &nan_step),
            Err(ProfileError::InvalidSamplingStep { .. })
        ));
    }

    #[test]
    fn tiny_step_hits_sample_limit() {
        let mut tiny = settings();
        tiny.coarse_step = 1e-9;
        match sample_line(Vec3::ZERO, Vec3::new(2.0, 1.0, 0.0), &tiny) {
            Err(ProfileError::SampleLimitExceeded { required, limit }) => {
                assert_eq!(limit, MAX_SAMPLES_PER_LINE);
                assert!(required > limit);
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[test]
    fn excessive_decimals_stay_finite() {
        let mut precise = settings();
        precise.decimals = 400;
        let points = sample_line(Vec3::ZERO, Vec3::new(2.0, 1.0, 0.0), &precise).unwrap();
        assert_eq!(points.len(), 5);
        assert!(points.iter().all(|p| p.x.is_finite() && p.y.is_finite()));
    }
}
