//! Runtime configuration assets.
//!
//! Settings are plain JSON deserialised through `bevy_common_assets`, so a
//! deployment can retune picking and display without a rebuild.

/// Picking, sampling, resolution, curve, chart and scene settings.
pub mod profile_settings;
