use bevy::prelude::*;
use constants::coordinate_system::PROBE_ORIGIN_ELEVATION;
use constants::render_settings::{CHART_HEIGHT, CHART_PADDING, CHART_WIDTH, CURVE_SEGMENTS_PER_SPAN};
use constants::sampling::{
    COARSE_STEP, COORDINATE_DECIMALS, FINE_STEP, LONG_LINE_THRESHOLD, MAX_COORDINATE_DECIMALS,
    MIN_PICK_DISTANCE, RESOLVE_DELAY_MS,
};
use serde::{Deserialize, Serialize};

/// Runtime configuration for picking, sampling, resolution and display.
/// Loaded from JSON; every field falls back to the shared constants.
#[derive(Resource, Asset, TypePath, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileSettings {
    #[serde(default)]
    pub sampling: SamplingSettings,
    #[serde(default)]
    pub resolution: ResolutionSettings,
    #[serde(default)]
    pub curve: CurveSettings,
    #[serde(default)]
    pub chart: ChartSettings,
    #[serde(default)]
    pub scene: SceneSettings,
}

/// Thresholds for the two-point line sampler.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingSettings {
    pub min_pick_distance: f32,
    pub long_line_threshold: f32,
    pub coarse_step: f32,
    pub fine_step: f32,
    pub decimals: u32,
}

impl Default for SamplingSettings {
    fn default() -> Self {
        Self {
            min_pick_distance: MIN_PICK_DISTANCE,
            long_line_threshold: LONG_LINE_THRESHOLD,
            coarse_step: COARSE_STEP,
            fine_step: FINE_STEP,
            decimals: COORDINATE_DECIMALS,
        }
    }
}

impl SamplingSettings {
    /// Step magnitude for a line of the given length.
    pub fn step_for(&self, distance: f32) -> f32 {
        if distance >= self.long_line_threshold {
            self.coarse_step
        } else {
            self.fine_step
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionSettings {
    /// Delay between completing a pick and probing elevations.
    pub resolve_delay_ms: u64,
    pub probe_origin_elevation: f32,
}

impl Default for ResolutionSettings {
    fn default() -> Self {
        Self {
            resolve_delay_ms: RESOLVE_DELAY_MS,
            probe_origin_elevation: PROBE_ORIGIN_ELEVATION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurveSettings {
    pub segments_per_span: usize,
}

impl Default for CurveSettings {
    fn default() -> Self {
        Self {
            segments_per_span: CURVE_SEGMENTS_PER_SPAN,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartSettings {
    pub width: f32,
    pub height: f32,
    pub padding: f32,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: CHART_WIDTH,
            height: CHART_HEIGHT,
            padding: CHART_PADDING,
        }
    }
}

/// Demo scene contents. The model, if any, streams in after startup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub model_path: Option<String>,
    pub terrain_size: f32,
    pub terrain_resolution: u32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            model_path: None,
            terrain_size: 8.0,
            terrain_resolution: 96,
        }
    }
}

/// A settings value the engine cannot run with.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SettingsError {
    #[error("{field} must be finite and above zero, got {value}")]
    NotPositive { field: &'static str, value: f32 },

    #[error("{field} must be finite and at least zero, got {value}")]
    Negative { field: &'static str, value: f32 },

    #[error("{field} must be finite, got {value}")]
    NotFinite { field: &'static str, value: f32 },

    #[error("sampling.decimals must be at most {max}, got {value}")]
    TooManyDecimals { value: u32, max: u32 },
}

fn positive(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), SettingsError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SettingsError::Negative { field, value })
    }
}

impl ProfileSettings {
    /// Reject values that would stall sampling or break layout.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let sampling = &self.sampling;
        non_negative("sampling.min_pick_distance", sampling.min_pick_distance)?;
        non_negative("sampling.long_line_threshold", sampling.long_line_threshold)?;
        positive("sampling.coarse_step", sampling.coarse_step)?;
        positive("sampling.fine_step", sampling.fine_step)?;
        if sampling.decimals > MAX_COORDINATE_DECIMALS {
            return Err(SettingsError::TooManyDecimals {
                value: sampling.decimals,
                max: MAX_COORDINATE_DECIMALS,
            });
        }

        if !self.resolution.probe_origin_elevation.is_finite() {
            return Err(SettingsError::NotFinite {
                field: "resolution.probe_origin_elevation",
                value: self.resolution.probe_origin_elevation,
            });
        }

        positive("chart.width", self.chart.width)?;
        positive("chart.height", self.chart.height)?;
        non_negative("chart.padding", self.chart.padding)?;
        positive("scene.terrain_size", self.scene.terrain_size)?;
        Ok(())
    }
}
