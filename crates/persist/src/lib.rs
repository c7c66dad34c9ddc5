//! Persistence: the per-session program state saved at shutdown and
//! restored at startup.
//!
//! # Invariants
//! - Fields are written and read in one fixed order, one value per line.
//! - A missing state file is not an error; it yields the defaults.
//! - Malformed content is reported, never silently half-applied.

pub mod state;

pub use state::{ProgramState, StateError};
