use crate::backend::{DrawCall, FrameUniforms, RenderBackend, RenderError, SkyboxDraw};
use fallgarden_common::{ModelHandle, ShaderHandle, TextureHandle};
use glam::{Mat4, Vec3};
use std::collections::BTreeSet;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    CompileShader {
        handle: ShaderHandle,
        vertex: PathBuf,
        fragment: PathBuf,
    },
    LoadModel {
        handle: ModelHandle,
        path: PathBuf,
    },
    LoadCubemap {
        handle: TextureHandle,
    },
    BeginFrame {
        clear_color: Vec3,
    },
    Draw {
        shader: ShaderHandle,
        model: ModelHandle,
        transform: Mat4,
        uniforms: FrameUniforms,
        cull_back_faces: bool,
    },
    DrawSkybox {
        shader: ShaderHandle,
        day: TextureHandle,
        fallen: TextureHandle,
        view: Mat4,
        coef: f32,
    },
}

/// In-memory backend that records every call instead of touching a GPU.
///
/// Loads always succeed unless the path was registered as missing, so a
/// full scene can be exercised without any files on disk.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<Command>,
    missing: BTreeSet<PathBuf>,
    next_shader: u32,
    next_model: u32,
    next_texture: u32,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend whose loads fail for the given paths.
    pub fn with_missing(paths: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            missing: paths.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    /// Model draws only (skybox excluded).
    pub fn draws(&self) -> impl Iterator<Item = &Command> {
        self.commands
            .iter()
            .filter(|c| matches!(c, Command::Draw { .. }))
    }

    /// Human-readable listing of the recorded calls.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for cmd in &self.commands {
            let _ = match cmd {
                Command::CompileShader {
                    handle,
                    vertex,
                    fragment,
                } => writeln!(
                    out,
                    "compile {handle} {} {}",
                    vertex.display(),
                    fragment.display()
                ),
                Command::LoadModel { handle, path } => {
                    writeln!(out, "load {handle} {}", path.display())
                }
                Command::LoadCubemap { handle } => writeln!(out, "cubemap {handle}"),
                Command::BeginFrame { clear_color: c } => {
                    writeln!(out, "=== frame clear=({:.2}, {:.2}, {:.2}) ===", c.x, c.y, c.z)
                }
                Command::Draw {
                    shader,
                    model,
                    transform,
                    cull_back_faces,
                    ..
                } => {
                    let p = transform.w_axis;
                    writeln!(
                        out,
                        "  draw {model} with {shader} at ({:.2}, {:.2}, {:.2}){}",
                        p.x,
                        p.y,
                        p.z,
                        if *cull_back_faces { " [culled]" } else { "" }
                    )
                }
                Command::DrawSkybox {
                    day, fallen, coef, ..
                } => writeln!(out, "  skybox {day} -> {fallen} coef={coef:.3}"),
            };
        }
        out
    }

    fn check(&self, path: &Path) -> Result<(), RenderError> {
        if self.missing.contains(path) {
            return Err(RenderError::MissingAsset(path.to_path_buf()));
        }
        Ok(())
    }
}

impl RenderBackend for RecordingBackend {
    fn compile_shader(
        &mut self,
        vertex: &Path,
        fragment: &Path,
    ) -> Result<ShaderHandle, RenderError> {
        self.check(vertex)?;
        self.check(fragment)?;
        let handle = ShaderHandle(self.next_shader);
        self.next_shader += 1;
        self.commands.push(Command::CompileShader {
            handle,
            vertex: vertex.to_path_buf(),
            fragment: fragment.to_path_buf(),
        });
        Ok(handle)
    }

    fn load_model(&mut self, path: &Path) -> Result<ModelHandle, RenderError> {
        self.check(path)?;
        let handle = ModelHandle(self.next_model);
        self.next_model += 1;
        self.commands.push(Command::LoadModel {
            handle,
            path: path.to_path_buf(),
        });
        Ok(handle)
    }

    fn load_cubemap(&mut self, faces: &[PathBuf]) -> Result<TextureHandle, RenderError> {
        if faces.len() != 6 {
            return Err(RenderError::IncompleteCubemap(faces.len()));
        }
        for face in faces {
            self.check(face)?;
        }
        let handle = TextureHandle(self.next_texture);
        self.next_texture += 1;
        self.commands.push(Command::LoadCubemap { handle });
        Ok(handle)
    }

    fn begin_frame(&mut self, clear_color: Vec3) {
        self.commands.push(Command::BeginFrame { clear_color });
    }

    fn draw(&mut self, call: &DrawCall<'_>) {
        self.commands.push(Command::Draw {
            shader: call.shader,
            model: call.model,
            transform: call.transform,
            uniforms: *call.uniforms,
            cull_back_faces: call.cull_back_faces,
        });
    }

    fn draw_skybox(&mut self, sky: &SkyboxDraw) {
        self.commands.push(Command::DrawSkybox {
            shader: sky.shader,
            day: sky.day,
            fallen: sky.fallen,
            view: sky.view,
            coef: sky.coef,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handles_are_sequential() {
        let mut b = RecordingBackend::new();
        let a = b.load_model(Path::new("a.obj")).unwrap();
        let c = b.load_model(Path::new("b.obj")).unwrap();
        assert_eq!(a, ModelHandle(0));
        assert_eq!(c, ModelHandle(1));
        assert_eq!(b.commands().len(), 2);
    }

    #[test]
    fn missing_paths_fail() {
        let mut b = RecordingBackend::with_missing([PathBuf::from("gone.obj")]);
        assert!(matches!(
            b.load_model(Path::new("gone.obj")),
            Err(RenderError::MissingAsset(_))
        ));
        assert!(b.commands().is_empty());
    }

    #[test]
    fn cubemap_needs_six_faces() {
        let mut b = RecordingBackend::new();
        let faces = vec![PathBuf::from("x.jpg"); 5];
        assert!(matches!(
            b.load_cubemap(&faces),
            Err(RenderError::IncompleteCubemap(5))
        ));
    }

    #[test]
    fn text_listing() {
        let mut b = RecordingBackend::new();
        b.begin_frame(Vec3::new(0.5, 0.5, 0.5));
        let text = b.to_text();
        assert!(text.contains("frame clear=(0.50, 0.50, 0.50)"));
    }
}
