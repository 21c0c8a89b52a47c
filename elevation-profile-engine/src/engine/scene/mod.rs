//! Scene contents and intersection queries.
//!
//! Provides the ray-cast abstraction the picking tools query, a mesh-backed
//! implementation over Bevy's ray casting, and the demo terrain.

/// Scene ray casting behind a trait, with mesh and analytic implementations.
///
/// Results are ordered nearest first and never include profile overlays.
pub mod raycast;

/// Procedural heightfield terrain and optional glTF model loading.
pub mod terrain;
