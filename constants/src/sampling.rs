/// Picks closer than this are rejected as too short.
pub const MIN_PICK_DISTANCE: f32 = 0.1;

/// Lines at least this long use the coarse step.
pub const LONG_LINE_THRESHOLD: f32 = 1.0;

/// Step along X for long lines.
pub const COARSE_STEP: f32 = 0.5;

/// Step along X for short lines.
pub const FINE_STEP: f32 = 0.2;

/// Decimal places kept on sampled coordinates.
pub const COORDINATE_DECIMALS: u32 = 2;

/// Rounding precision ceiling; f64 holds about 15 significant digits.
pub const MAX_COORDINATE_DECIMALS: u32 = 15;

/// Most points one line may be sampled into.
pub const MAX_SAMPLES_PER_LINE: usize = 100_000;

/// Delay between a completed pick and elevation resolution.
pub const RESOLVE_DELAY_MS: u64 = 500;

/// Round `value` to `decimals` places, half away from zero.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let scale = 10f64.powi(decimals as i32);
    (value * scale).round() / scale
}
