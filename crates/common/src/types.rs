use serde::{Deserialize, Serialize};
use std::fmt;

/// Handle to a model loaded by a render backend.
///
/// Handles are opaque to the scene crates; only the backend that issued a
/// handle knows what it refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ModelHandle(pub u32);

/// Handle to a compiled shader program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ShaderHandle(pub u32);

/// Handle to a texture (cubemaps included).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

impl fmt::Display for ModelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "model#{}", self.0)
    }
}

impl fmt::Display for ShaderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shader#{}", self.0)
    }
}

impl fmt::Display for TextureHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "texture#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_order_by_index() {
        assert!(ModelHandle(1) < ModelHandle(2));
        assert_eq!(ShaderHandle(3), ShaderHandle(3));
    }

    #[test]
    fn handle_display() {
        assert_eq!(ModelHandle(4).to_string(), "model#4");
        assert_eq!(TextureHandle(0).to_string(), "texture#0");
    }
}
