//! wgpu render backend for the garden scene.
//!
//! [`ProxyBackend`] implements the renderer-agnostic backend trait on the
//! CPU side: it hands out handles and batches each frame's draws.
//! [`WgpuRenderer`] uploads a batch and draws it. Every model is stood in
//! for by a unit cube at the instance's pose, tinted per model; the
//! skybox cross-fade becomes a blend between two sky tints used as the
//! clear color.
//!
//! # Invariants
//! - Renderer never mutates scene or lighting state.
//! - Camera motion is not part of the lighting state machine; only the
//!   camera position crosses that boundary.

mod backend;
mod camera;
mod gpu;
mod shaders;

pub use backend::{FrameBatch, InstanceData, ProxyBackend};
pub use camera::FlyCamera;
pub use gpu::WgpuRenderer;
