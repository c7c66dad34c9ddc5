//! Lighting/Event State Machine.
//!
//! Owns the three scene lights and advances them once per frame from the
//! host clock and the camera position. A single irreversible event
//! (the camera stepping inside the trigger radius) freezes the orbiting
//! point light, wakes a red spot light aimed at the camera, dims the
//! directional light and ramps the skybox blend coefficient to 1.
//!
//! # Invariants
//! - The event goes `Dormant -> Triggered` at most once per rig and never back.
//! - Once triggered, the trigger time is fixed and the coefficient is a
//!   non-decreasing function of elapsed time clamped to `[0, 1]`.
//! - Every update is pure arithmetic and cannot fail; NaN inputs produce
//!   NaN outputs rather than panics.

pub mod event;
pub mod lights;
pub mod rig;

pub use event::{EventConfig, EventState};
pub use lights::{DirLight, PointLight, SpotLight};
pub use rig::{FrameLighting, LightingRig, light_marker_transform};
