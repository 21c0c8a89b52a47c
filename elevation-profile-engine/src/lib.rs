//! Elevation profiles picked from a 3D scene.
//!
//! Two clicks on a surface define a line on the X/Y plane. The line is
//! sampled, every sample is probed vertically for its elevation, and the
//! result is drawn as a smooth curve in the scene and as a 2D chart.

pub mod engine;
pub mod rpc;
pub mod tools;
