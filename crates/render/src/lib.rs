//! Rendering Adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - The backend never mutates scene or lighting state.
//! - Per-frame lighting is computed before any draw of that frame is issued.
//! - Draws are submitted in layout order, then the light marker, then the skybox.
//!
//! A [`RecordingBackend`] stands in for a GPU: it records every call and
//! can print the frame as text, which the CLI and the tests rely on.

mod backend;
mod frame;
mod recording;

pub use backend::{DrawCall, FrameUniforms, RenderBackend, RenderError, SkyboxDraw};
pub use frame::{
    CameraView, SCREEN_HEIGHT, SCREEN_WIDTH, SHININESS, SceneAssets, SceneSession, SceneShaders,
    skybox_faces,
};
pub use recording::{Command, RecordingBackend};
