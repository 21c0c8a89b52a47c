use bevy::prelude::*;

/// Conditions that stop a pick, a probe or a curve from being produced.
///
/// None of these are fatal. Systems log them and the tool returns to an idle,
/// re-enterable state.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProfileError {
    #[error("click landed outside the render surface")]
    OutsideRenderSurface,

    #[error("ray hit nothing in the scene")]
    NoIntersection,

    #[error("picked points are {distance:.3} apart, minimum is {minimum}")]
    PointPairTooClose { distance: f32, minimum: f32 },

    #[error("picked points share x = {x}, line cannot be sampled along x")]
    DegenerateVertical { x: f32 },

    #[error("sampling step {step} is not a finite value above zero")]
    InvalidSamplingStep { step: f32 },

    #[error("line needs {required} samples, limit is {limit}")]
    SampleLimitExceeded { required: usize, limit: usize },

    #[error("no surface above or below sample {index} at ({x}, {y})")]
    UnresolvedElevationPoint { index: usize, x: f32, y: f32 },

    #[error("{resolved} elevation samples resolved, at least 2 are needed")]
    InsufficientElevationSamples { resolved: usize },
}

impl ProfileError {
    /// Short machine-readable tag for frontend notifications.
    pub fn code(&self) -> &'static str {
        match self {
            Self::OutsideRenderSurface => "outside_render_surface",
            Self::NoIntersection => "no_intersection",
            Self::PointPairTooClose { .. } => "point_pair_too_close",
            Self::DegenerateVertical { .. } => "degenerate_vertical",
            Self::InvalidSamplingStep { .. } => "invalid_sampling_step",
            Self::SampleLimitExceeded { .. } => "sample_limit_exceeded",
            Self::UnresolvedElevationPoint { .. } => "unresolved_elevation_point",
            Self::InsufficientElevationSamples { .. } => "insufficient_elevation_samples",
        }
    }

    /// Emit the diagnostic at the severity the condition warrants.
    pub fn log(&self) {
        match self {
            Self::OutsideRenderSurface => trace!("Pick ignored: {}", self),
            Self::NoIntersection => debug!("Pick ignored: {}", self),
            _ => warn!("{}", self),
        }
    }
}
