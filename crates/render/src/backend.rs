use fallgarden_common::{ModelHandle, ShaderHandle, TextureHandle};
use fallgarden_lighting::FrameLighting;
use glam::{Mat4, Vec3};
use std::path::{Path, PathBuf};

/// Errors a backend reports while loading resources.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("asset missing or unreadable: {0}")]
    MissingAsset(PathBuf),
    #[error("unknown shader program: {0}")]
    UnknownShader(PathBuf),
    #[error("cubemap needs six faces, got {0}")]
    IncompleteCubemap(usize),
}

/// Uniforms shared by every draw of a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    pub view: Mat4,
    pub projection: Mat4,
    pub view_position: Vec3,
    pub shininess: f32,
    pub lighting: FrameLighting,
}

/// One model draw.
#[derive(Debug, Clone, Copy)]
pub struct DrawCall<'a> {
    pub shader: ShaderHandle,
    pub model: ModelHandle,
    pub transform: Mat4,
    pub uniforms: &'a FrameUniforms,
    pub cull_back_faces: bool,
}

/// Skybox cross-fade between the clear-day and fallen cubemaps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SkyboxDraw {
    pub shader: ShaderHandle,
    pub day: TextureHandle,
    pub fallen: TextureHandle,
    /// View matrix with the translation removed.
    pub view: Mat4,
    pub projection: Mat4,
    pub coef: f32,
}

/// What the scene needs from a graphics API.
///
/// Load operations may fail per asset; callers decide whether a failure is
/// fatal. Draw operations are fire-and-forget.
pub trait RenderBackend {
    fn compile_shader(&mut self, vertex: &Path, fragment: &Path)
    -> Result<ShaderHandle, RenderError>;

    fn load_model(&mut self, path: &Path) -> Result<ModelHandle, RenderError>;

    fn load_cubemap(&mut self, faces: &[PathBuf]) -> Result<TextureHandle, RenderError>;

    /// Start a frame cleared to `clear_color`.
    fn begin_frame(&mut self, clear_color: Vec3);

    fn draw(&mut self, call: &DrawCall<'_>);

    fn draw_skybox(&mut self, sky: &SkyboxDraw);
}
