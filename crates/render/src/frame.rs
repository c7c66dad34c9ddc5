use crate::backend::{DrawCall, FrameUniforms, RenderBackend, RenderError, SkyboxDraw};
use fallgarden_common::{ModelHandle, ShaderHandle, TextureHandle};
use fallgarden_lighting::{FrameLighting, LightingRig, light_marker_transform};
use fallgarden_scene::{SceneLayout, Species, garden};
use glam::{Mat3, Mat4, Vec3};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

pub const SCREEN_WIDTH: u32 = 1200;
pub const SCREEN_HEIGHT: u32 = 900;

/// Material shininess uploaded with every lit draw.
pub const SHININESS: f32 = 32.0;

/// Cubemap face paths in upload order: front, back, up, down, right, left.
pub fn skybox_faces(resources: &Path, name: &str) -> Vec<PathBuf> {
    ["ft", "bk", "up", "dn", "rt", "lf"]
        .iter()
        .map(|side| {
            resources
                .join("textures")
                .join("skybox")
                .join(format!("{name}_{side}.jpg"))
        })
        .collect()
}

/// The three shader programs the scene uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneShaders {
    pub model: ShaderHandle,
    pub light_marker: ShaderHandle,
    pub skybox: ShaderHandle,
}

impl SceneShaders {
    /// Compile all programs. Any failure is fatal for the scene.
    pub fn compile<B: RenderBackend>(backend: &mut B, resources: &Path) -> Result<Self, RenderError> {
        let dir = resources.join("shaders");
        let mut compile = |stem: &str| {
            backend.compile_shader(
                &dir.join(format!("{stem}.vs")),
                &dir.join(format!("{stem}.fs")),
            )
        };
        Ok(Self {
            model: compile("2.model_lighting")?,
            light_marker: compile("pointlight")?,
            skybox: compile("skybox")?,
        })
    }
}

/// Everything loaded from disk at startup.
///
/// Models and cubemaps that failed to load are simply absent.
#[derive(Debug, Clone)]
pub struct SceneAssets {
    pub shaders: SceneShaders,
    pub models: BTreeMap<Species, ModelHandle>,
    pub day_sky: Option<TextureHandle>,
    pub fallen_sky: Option<TextureHandle>,
}

impl SceneAssets {
    pub fn load<B: RenderBackend>(backend: &mut B, resources: &Path) -> Result<Self, RenderError> {
        let shaders = SceneShaders::compile(backend, resources)?;

        let mut models = BTreeMap::new();
        for species in Species::ALL {
            let path = resources.join(species.model_path());
            match backend.load_model(&path) {
                Ok(handle) => {
                    models.insert(species, handle);
                }
                Err(e) => tracing::warn!("{} not loaded: {e}", species.name()),
            }
        }

        let mut load_sky = |name: &str| match backend.load_cubemap(&skybox_faces(resources, name)) {
            Ok(handle) => Some(handle),
            Err(e) => {
                tracing::warn!("skybox {name} not loaded: {e}");
                None
            }
        };
        let day_sky = load_sky("bluecloud");
        let fallen_sky = load_sky("browncloud");

        tracing::info!(
            models = models.len(),
            skyboxes = usize::from(day_sky.is_some()) + usize::from(fallen_sky.is_some()),
            "scene assets loaded"
        );

        Ok(Self {
            shaders,
            models,
            day_sky,
            fallen_sky,
        })
    }

    /// Statue drawn at the point light, if it loaded.
    pub fn light_marker(&self) -> Option<ModelHandle> {
        self.models.get(&Species::Angel).copied()
    }
}

/// Camera state the frame needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraView {
    pub position: Vec3,
    pub view: Mat4,
    pub projection: Mat4,
}

/// Per-session scene context: assets, static layout and lighting state.
#[derive(Debug, Clone)]
pub struct SceneSession {
    assets: SceneAssets,
    layout: SceneLayout,
    rig: LightingRig,
}

impl SceneSession {
    pub fn new(assets: SceneAssets, rig: LightingRig) -> Self {
        let layout = SceneLayout::new(&garden::placements(&assets.models));
        tracing::info!(instances = layout.len(), "scene layout built");
        Self {
            assets,
            layout,
            rig,
        }
    }

    pub fn assets(&self) -> &SceneAssets {
        &self.assets
    }

    pub fn layout(&self) -> &SceneLayout {
        &self.layout
    }

    pub fn rig(&self) -> &LightingRig {
        &self.rig
    }

    pub fn rig_mut(&mut self) -> &mut LightingRig {
        &mut self.rig
    }

    /// Advance lighting to `now` and submit the whole frame to `backend`.
    pub fn render_frame<B: RenderBackend>(
        &mut self,
        backend: &mut B,
        now: f32,
        camera: &CameraView,
        clear_color: Vec3,
    ) -> FrameLighting {
        let lighting = self.rig.update(now, camera.position);
        let uniforms = FrameUniforms {
            view: camera.view,
            projection: camera.projection,
            view_position: camera.position,
            shininess: SHININESS,
            lighting,
        };
        let shaders = self.assets.shaders;

        backend.begin_frame(clear_color);

        for (instance, transform) in self.layout.iter() {
            backend.draw(&DrawCall {
                shader: shaders.model,
                model: instance.model,
                transform: *transform,
                uniforms: &uniforms,
                cull_back_faces: instance.cull_back_faces,
            });
        }

        if let Some(marker) = self.assets.light_marker() {
            backend.draw(&DrawCall {
                shader: shaders.light_marker,
                model: marker,
                transform: light_marker_transform(
                    lighting.point.position,
                    now,
                    self.rig.event(),
                ),
                uniforms: &uniforms,
                cull_back_faces: false,
            });
        }

        // With one cubemap missing, the other is used for both ends of the fade.
        let skies = match (self.assets.day_sky, self.assets.fallen_sky) {
            (Some(day), Some(fallen)) => Some((day, fallen)),
            (Some(only), None) | (None, Some(only)) => Some((only, only)),
            (None, None) => None,
        };
        if let Some((day, fallen)) = skies {
            backend.draw_skybox(&SkyboxDraw {
                shader: shaders.skybox,
                day,
                fallen,
                view: Mat4::from_mat3(Mat3::from_mat4(camera.view)),
                projection: camera.projection,
                coef: lighting.coef,
            });
        }

        lighting
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::{Command, RecordingBackend};

    fn resources() -> PathBuf {
        PathBuf::from("resources")
    }

    fn camera_at(position: Vec3) -> CameraView {
        CameraView {
            position,
            view: Mat4::look_at_rh(position, Vec3::ZERO, Vec3::Y),
            projection: Mat4::perspective_rh(
                45.0_f32.to_radians(),
                SCREEN_WIDTH as f32 / SCREEN_HEIGHT as f32,
                0.1,
                100.0,
            ),
        }
    }

    fn session(backend: &mut RecordingBackend) -> SceneSession {
        let assets = SceneAssets::load(backend, &resources()).unwrap();
        backend.clear();
        SceneSession::new(assets, LightingRig::new())
    }

    #[test]
    fn loads_every_asset_with_recording_backend() {
        let mut backend = RecordingBackend::new();
        let assets = SceneAssets::load(&mut backend, &resources()).unwrap();
        assert_eq!(assets.models.len(), Species::ALL.len());
        assert!(assets.day_sky.is_some());
        assert!(assets.fallen_sky.is_some());
        assert!(assets.light_marker().is_some());
    }

    #[test]
    fn frame_order_is_layout_marker_skybox() {
        let mut backend = RecordingBackend::new();
        let mut scene = session(&mut backend);
        scene.render_frame(&mut backend, 0.0, &camera_at(Vec3::new(10.0, 10.0, 10.0)), Vec3::ZERO);

        let cmds = backend.commands();
        assert!(matches!(cmds[0], Command::BeginFrame { .. }));
        let draws = cmds.iter().filter(|c| matches!(c, Command::Draw { .. })).count();
        assert_eq!(draws, 42 + 1);
        match &cmds[cmds.len() - 2] {
            Command::Draw { shader, .. } => assert_eq!(*shader, scene.assets().shaders.light_marker),
            other => panic!("expected marker draw, got {other:?}"),
        }
        assert!(matches!(cmds.last(), Some(Command::DrawSkybox { .. })));
    }

    #[test]
    fn missing_model_is_skipped() {
        let missing = resources().join(Species::Rose.model_path());
        let mut backend = RecordingBackend::with_missing([missing]);
        let mut scene = session(&mut backend);
        assert!(!scene.assets().models.contains_key(&Species::Rose));

        scene.render_frame(&mut backend, 0.0, &camera_at(Vec3::splat(10.0)), Vec3::ZERO);
        assert_eq!(backend.draws().count(), 42 - 18 + 1);
    }

    #[test]
    fn missing_skybox_face_falls_back() {
        let face = skybox_faces(&resources(), "browncloud").remove(2);
        let mut backend = RecordingBackend::with_missing([face]);
        let mut scene = session(&mut backend);
        assert!(scene.assets().fallen_sky.is_none());

        scene.render_frame(&mut backend, 0.0, &camera_at(Vec3::splat(10.0)), Vec3::ZERO);
        match backend.commands().last() {
            Some(Command::DrawSkybox { day, fallen, .. }) => assert_eq!(day, fallen),
            other => panic!("expected skybox, got {other:?}"),
        }
    }

    #[test]
    fn missing_shader_is_fatal() {
        let vs = resources().join("shaders").join("skybox.vs");
        let mut backend = RecordingBackend::with_missing([vs]);
        assert!(SceneAssets::load(&mut backend, &resources()).is_err());
    }

    #[test]
    fn skybox_receives_coef_and_rotation_only_view() {
        let mut backend = RecordingBackend::new();
        let mut scene = session(&mut backend);
        let near = camera_at(Vec3::new(0.0, 10.0, 3.0));
        scene.render_frame(&mut backend, 1.0, &near, Vec3::ZERO);
        backend.clear();
        scene.render_frame(&mut backend, 4.5, &near, Vec3::ZERO);

        match backend.commands().last() {
            Some(Command::DrawSkybox { coef, view, .. }) => {
                assert_eq!(*coef, 0.5);
                assert_eq!(view.w_axis, glam::Vec4::W);
            }
            other => panic!("expected skybox, got {other:?}"),
        }
    }

    #[test]
    fn every_draw_of_a_frame_shares_lighting() {
        let mut backend = RecordingBackend::new();
        let mut scene = session(&mut backend);
        let lighting = scene.render_frame(&mut backend, 2.0, &camera_at(Vec3::splat(10.0)), Vec3::ZERO);
        for draw in backend.draws() {
            if let Command::Draw { uniforms, .. } = draw {
                assert_eq!(uniforms.lighting, lighting);
                assert_eq!(uniforms.shininess, SHININESS);
            }
        }
    }

    #[test]
    fn skybox_faces_order() {
        let faces = skybox_faces(Path::new("res"), "bluecloud");
        assert_eq!(faces.len(), 6);
        assert!(faces[0].ends_with("bluecloud_ft.jpg"));
        assert!(faces[5].ends_with("bluecloud_lf.jpg"));
    }
}
