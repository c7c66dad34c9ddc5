//! Scene Layout Generator: turns per-species placement lists into the
//! ordered sequence of model instances drawn every frame.
//!
//! # Invariants
//! - Generation is pure: the same placements always yield bit-identical
//!   instances and transforms.
//! - Output order follows species order, then authored order within a species.
//! - A mirrored species emits its base instance immediately followed by the
//!   mirrored one, both carrying the same instance index.

pub mod garden;
pub mod layout;

pub use garden::Species;
pub use layout::{
    FixedPlacement, MirroredPlacement, ModelInstance, PlacementRule, SceneLayout,
    SpeciesPlacement, build_layout, mirror,
};
