//! Developer tooling: read-only views of a running scene for the overlay
//! and the CLI.

pub mod inspector;

pub use inspector::{InstanceInfo, SceneInspector, SceneSummary, SpeciesCount};
