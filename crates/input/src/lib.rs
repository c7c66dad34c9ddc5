//! Input vocabulary: the window layer maps raw events to [`Action`]s and
//! keeps movement keys in a [`HeldMovement`].
//!
//! # Invariants
//! - Holding several movement keys never moves the camera faster than
//!   holding one.

pub mod action;

pub use action::{Action, CameraMovement, HeldMovement};
