use bytemuck::{Pod, Zeroable};
use fallgarden_common::{ModelHandle, ShaderHandle, TextureHandle};
use fallgarden_render::{DrawCall, FrameUniforms, RenderBackend, RenderError, SkyboxDraw};
use glam::{Mat4, Vec3};
use std::path::{Path, PathBuf};

/// Edge length of the cube standing in for every model.
const PROXY_SIZE: f32 = 0.5;

const MODEL_PALETTE: [[f32; 3]; 8] = [
    [0.55, 0.35, 0.2],
    [0.35, 0.45, 0.2],
    [0.45, 0.55, 0.25],
    [0.3, 0.5, 0.3],
    [0.95, 0.7, 0.15],
    [0.85, 0.15, 0.25],
    [0.3, 0.7, 0.25],
    [0.9, 0.9, 0.85],
];

const DAY_TINT: Vec3 = Vec3::new(0.45, 0.65, 0.9);
const FALLEN_TINT: Vec3 = Vec3::new(0.45, 0.28, 0.18);

/// Per-instance vertex data shared with the GPU pipeline.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct InstanceData {
    pub model_0: [f32; 4],
    pub model_1: [f32; 4],
    pub model_2: [f32; 4],
    pub model_3: [f32; 4],
    /// RGB tint; `w` is 1 for unlit (emissive) instances.
    pub color: [f32; 4],
}

impl InstanceData {
    fn new(model: Mat4, rgb: [f32; 3], emissive: bool) -> Self {
        let cols = model.to_cols_array_2d();
        Self {
            model_0: cols[0],
            model_1: cols[1],
            model_2: cols[2],
            model_3: cols[3],
            color: [rgb[0], rgb[1], rgb[2], if emissive { 1.0 } else { 0.0 }],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ShaderKind {
    Lit,
    Marker,
    Skybox,
}

/// Draws collected for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameBatch {
    pub clear_color: Vec3,
    pub uniforms: Option<FrameUniforms>,
    /// Instances drawn with both faces.
    pub lit: Vec<InstanceData>,
    /// Instances drawn with back-face culling.
    pub culled: Vec<InstanceData>,
}

impl FrameBatch {
    pub fn instance_count(&self) -> usize {
        self.lit.len() + self.culled.len()
    }
}

/// CPU side of the wgpu backend.
///
/// Shader programs are built in, so compiling only resolves the program
/// name. Models and cubemaps must exist on disk; their contents are not
/// decoded.
#[derive(Debug, Default)]
pub struct ProxyBackend {
    shaders: Vec<ShaderKind>,
    model_colors: Vec<[f32; 3]>,
    sky_tints: Vec<Vec3>,
    frame: FrameBatch,
}

impl ProxyBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// The batch built since the last `begin_frame`.
    pub fn frame(&self) -> &FrameBatch {
        &self.frame
    }

    fn shader_kind(&self, handle: ShaderHandle) -> Option<ShaderKind> {
        self.shaders.get(handle.0 as usize).copied()
    }

    fn sky_tint(&self, handle: TextureHandle) -> Vec3 {
        self.sky_tints
            .get(handle.0 as usize)
            .copied()
            .unwrap_or(DAY_TINT)
    }
}

/// Tint standing in for a cubemap, picked by the face file names.
fn sky_tint_for(faces: &[PathBuf]) -> Vec3 {
    let fallen = faces.iter().any(|face| {
        face.file_stem()
            .and_then(|s| s.to_str())
            .is_some_and(|stem| stem.starts_with("browncloud"))
    });
    if fallen { FALLEN_TINT } else { DAY_TINT }
}

fn require_file(path: &Path) -> Result<(), RenderError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(RenderError::MissingAsset(path.to_path_buf()))
    }
}

fn proxy_transform(transform: Mat4) -> Mat4 {
    let (_, rotation, translation) = transform.to_scale_rotation_translation();
    Mat4::from_scale_rotation_translation(Vec3::splat(PROXY_SIZE), rotation, translation)
}

impl RenderBackend for ProxyBackend {
    fn compile_shader(
        &mut self,
        vertex: &Path,
        _fragment: &Path,
    ) -> Result<ShaderHandle, RenderError> {
        let kind = match vertex.file_stem().and_then(|s| s.to_str()) {
            Some("2.model_lighting") => ShaderKind::Lit,
            Some("pointlight") => ShaderKind::Marker,
            Some("skybox") => ShaderKind::Skybox,
            _ => return Err(RenderError::UnknownShader(vertex.to_path_buf())),
        };
        let handle = ShaderHandle(self.shaders.len() as u32);
        self.shaders.push(kind);
        tracing::debug!("{handle} resolved to {kind:?}");
        Ok(handle)
    }

    fn load_model(&mut self, path: &Path) -> Result<ModelHandle, RenderError> {
        require_file(path)?;
        let handle = ModelHandle(self.model_colors.len() as u32);
        self.model_colors
            .push(MODEL_PALETTE[self.model_colors.len() % MODEL_PALETTE.len()]);
        tracing::debug!("{handle} <- {}", path.display());
        Ok(handle)
    }

    fn load_cubemap(&mut self, faces: &[PathBuf]) -> Result<TextureHandle, RenderError> {
        if faces.len() != 6 {
            return Err(RenderError::IncompleteCubemap(faces.len()));
        }
        for face in faces {
            require_file(face)?;
        }
        let handle = TextureHandle(self.sky_tints.len() as u32);
        let tint = sky_tint_for(faces);
        self.sky_tints.push(tint);
        tracing::debug!("{handle} tinted ({:.2}, {:.2}, {:.2})", tint.x, tint.y, tint.z);
        Ok(handle)
    }

    fn begin_frame(&mut self, clear_color: Vec3) {
        self.frame.clear_color = clear_color;
        self.frame.uniforms = None;
        self.frame.lit.clear();
        self.frame.culled.clear();
    }

    fn draw(&mut self, call: &DrawCall<'_>) {
        let Some(kind) = self.shader_kind(call.shader) else {
            tracing::warn!("draw with unknown {}", call.shader);
            return;
        };
        let rgb = self
            .model_colors
            .get(call.model.0 as usize)
            .copied()
            .unwrap_or([1.0, 0.0, 1.0]);
        let instance = InstanceData::new(
            proxy_transform(call.transform),
            rgb,
            kind == ShaderKind::Marker,
        );
        self.frame.uniforms = Some(*call.uniforms);
        if call.cull_back_faces {
            self.frame.culled.push(instance);
        } else {
            self.frame.lit.push(instance);
        }
    }

    fn draw_skybox(&mut self, sky: &SkyboxDraw) {
        if self.shader_kind(sky.shader) != Some(ShaderKind::Skybox) {
            tracing::warn!("skybox drawn with {}", sky.shader);
        }
        let day = self.sky_tint(sky.day);
        let fallen = self.sky_tint(sky.fallen);
        self.frame.clear_color = day.lerp(fallen, sky.coef.clamp(0.0, 1.0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fallgarden_lighting::LightingRig;
    use fallgarden_render::{CameraView, SceneAssets, SceneSession, skybox_faces};
    use fallgarden_scene::Species;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    fn camera() -> CameraView {
        let position = Vec3::splat(10.0);
        CameraView {
            position,
            view: Mat4::look_at_rh(position, Vec3::ZERO, Vec3::Y),
            projection: Mat4::perspective_rh(0.8, 4.0 / 3.0, 0.1, 100.0),
        }
    }

    #[test]
    fn shader_names_resolve_to_programs() {
        let mut b = ProxyBackend::new();
        let dir = Path::new("shaders");
        assert!(
            b.compile_shader(&dir.join("pointlight.vs"), &dir.join("pointlight.fs"))
                .is_ok()
        );
        assert!(matches!(
            b.compile_shader(&dir.join("toon.vs"), &dir.join("toon.fs")),
            Err(RenderError::UnknownShader(_))
        ));
    }

    #[test]
    fn models_must_exist() {
        let tmp = tempfile::tempdir().unwrap();
        let present = tmp.path().join("a.obj");
        touch(&present);
        let mut b = ProxyBackend::new();
        assert_eq!(b.load_model(&present).unwrap(), ModelHandle(0));
        assert!(matches!(
            b.load_model(&tmp.path().join("b.obj")),
            Err(RenderError::MissingAsset(_))
        ));
    }

    #[test]
    fn skybox_blends_tints() {
        let tmp = tempfile::tempdir().unwrap();
        let mut b = ProxyBackend::new();
        let day_faces = skybox_faces(tmp.path(), "bluecloud");
        let fallen_faces = skybox_faces(tmp.path(), "browncloud");
        day_faces.iter().chain(&fallen_faces).for_each(|f| touch(f));
        let day = b.load_cubemap(&day_faces).unwrap();
        let fallen = b.load_cubemap(&fallen_faces).unwrap();
        let shader = b
            .compile_shader(Path::new("skybox.vs"), Path::new("skybox.fs"))
            .unwrap();

        b.begin_frame(Vec3::ZERO);
        b.draw_skybox(&SkyboxDraw {
            shader,
            day,
            fallen,
            view: Mat4::IDENTITY,
            projection: Mat4::IDENTITY,
            coef: 0.5,
        });
        let expected = DAY_TINT.lerp(FALLEN_TINT, 0.5);
        assert!(b.frame().clear_color.abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn lone_fallen_sky_keeps_its_tint() {
        let tmp = tempfile::tempdir().unwrap();
        for species in Species::ALL {
            touch(&tmp.path().join(species.model_path()));
        }
        skybox_faces(tmp.path(), "browncloud")
            .iter()
            .for_each(|f| touch(f));
        let mut b = ProxyBackend::new();
        let assets = SceneAssets::load(&mut b, tmp.path()).unwrap();
        assert!(assets.day_sky.is_none());
        assert!(assets.fallen_sky.is_some());
        let mut session = SceneSession::new(assets, LightingRig::new());

        let near = CameraView {
            position: Vec3::new(0.0, 10.0, 3.0),
            ..camera()
        };
        session.render_frame(&mut b, 1.0, &near, Vec3::ZERO);
        assert_eq!(b.frame().clear_color, FALLEN_TINT);
        session.render_frame(&mut b, 20.0, &near, Vec3::ZERO);
        assert_eq!(b.frame().clear_color, FALLEN_TINT);
    }

    #[test]
    fn scene_frame_splits_culled_instances() {
        let tmp = tempfile::tempdir().unwrap();
        for species in Species::ALL {
            touch(&tmp.path().join(species.model_path()));
        }
        let mut b = ProxyBackend::new();
        let assets = SceneAssets::load(&mut b, tmp.path()).unwrap();
        assert!(assets.day_sky.is_none());
        let mut session = SceneSession::new(assets, LightingRig::new());

        let lighting = session.render_frame(&mut b, 0.0, &camera(), Vec3::new(0.2, 0.2, 0.2));
        let frame = b.frame();
        assert_eq!(frame.instance_count(), 42 + 1);
        assert_eq!(frame.culled.len(), 1);
        assert_eq!(frame.uniforms.map(|u| u.lighting), Some(lighting));
        // No skybox loaded, so the clear color is left alone.
        assert_eq!(frame.clear_color, Vec3::new(0.2, 0.2, 0.2));
        assert_eq!(frame.lit.iter().filter(|i| i.color[3] == 1.0).count(), 1);
    }
}
