//! Shared types for the fallgarden workspace.

mod types;

pub use types::{ModelHandle, ShaderHandle, TextureHandle};
