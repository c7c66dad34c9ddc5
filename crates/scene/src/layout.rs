use fallgarden_common::ModelHandle;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Extra yaw per instance index, in degrees.
pub const INDEX_YAW_DEGREES: f32 = 14.22;

/// One placed copy of a model.
///
/// Instances are produced once at scene-build time and never mutated; the
/// renderer reads them every frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelInstance {
    pub model: ModelHandle,
    /// Explicit rotation in degrees. Zero means no explicit rotation.
    pub rotation_angle: f32,
    /// Rotation axis; normalized when the transform is built.
    pub rotation_axis: Vec3,
    pub scale: Vec3,
    pub translation: Vec3,
    /// Drives the deterministic yaw jitter when present.
    pub instance_index: Option<u32>,
    pub cull_back_faces: bool,
}

impl ModelInstance {
    /// Model matrix: `T(translation) * S(scale) * Ry(index * 14.22°) * R(angle, axis)`.
    pub fn transform(&self) -> Mat4 {
        let mut m = Mat4::from_translation(self.translation) * Mat4::from_scale(self.scale);
        if let Some(index) = self.instance_index {
            m *= Mat4::from_rotation_y((index as f32 * INDEX_YAW_DEGREES).to_radians());
        }
        if self.rotation_angle != 0.0 {
            m *= Mat4::from_axis_angle(
                self.rotation_axis.normalize(),
                self.rotation_angle.to_radians(),
            );
        }
        m
    }
}

/// A single hand-authored placement with no duplication.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FixedPlacement {
    pub rotation_angle: f32,
    pub rotation_axis: Vec3,
    pub scale: Vec3,
    pub translation: Vec3,
}

impl FixedPlacement {
    pub fn new(rotation_angle: f32, rotation_axis: Vec3, scale: f32, translation: Vec3) -> Self {
        Self {
            rotation_angle,
            rotation_axis,
            scale: Vec3::splat(scale),
            translation,
        }
    }
}

/// Base coordinates that are each emitted twice: as authored and mirrored.
///
/// Per-index variety comes from the index alone: the rotation axis is
/// `(1, axis_wobble * cos(i), 0)` and the uniform scale is
/// `base_scale + scale_jitter * sin(i)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirroredPlacement {
    pub positions: Vec<Vec3>,
    pub rotation_angle: f32,
    pub axis_wobble: f32,
    pub base_scale: f32,
    pub scale_jitter: f32,
}

impl MirroredPlacement {
    pub fn scale_for(&self, index: u32) -> f32 {
        self.base_scale + self.scale_jitter * (index as f32).sin()
    }

    pub fn axis_for(&self, index: u32) -> Vec3 {
        Vec3::new(1.0, (index as f32).cos() * self.axis_wobble, 0.0)
    }
}

/// How a species turns its authored data into instances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlacementRule {
    Fixed(Vec<FixedPlacement>),
    Mirrored(MirroredPlacement),
}

/// Placement data for every instance of one model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesPlacement {
    pub model: ModelHandle,
    pub rule: PlacementRule,
    pub cull_back_faces: bool,
}

/// The fixed mirroring map: `(x, y, z) -> (1.1 z, y, 1.2 x)`.
pub fn mirror(p: Vec3) -> Vec3 {
    Vec3::new(1.1 * p.z, p.y, 1.2 * p.x)
}

/// Expand placements into the ordered instance list.
///
/// Empty placement lists simply contribute nothing.
pub fn build_layout(species: &[SpeciesPlacement]) -> Vec<ModelInstance> {
    let mut out = Vec::new();
    for sp in species {
        let before = out.len();
        match &sp.rule {
            PlacementRule::Fixed(list) => {
                out.extend(list.iter().map(|p| ModelInstance {
                    model: sp.model,
                    rotation_angle: p.rotation_angle,
                    rotation_axis: p.rotation_axis,
                    scale: p.scale,
                    translation: p.translation,
                    instance_index: None,
                    cull_back_faces: sp.cull_back_faces,
                }));
            }
            PlacementRule::Mirrored(rule) => {
                for (i, base) in rule.positions.iter().enumerate() {
                    let index = i as u32;
                    let instance = ModelInstance {
                        model: sp.model,
                        rotation_angle: rule.rotation_angle,
                        rotation_axis: rule.axis_for(index),
                        scale: Vec3::splat(rule.scale_for(index)),
                        translation: *base,
                        instance_index: Some(index),
                        cull_back_faces: sp.cull_back_faces,
                    };
                    out.push(instance);
                    out.push(ModelInstance {
                        translation: mirror(*base),
                        ..instance
                    });
                }
            }
        }
        tracing::debug!(model = %sp.model, count = out.len() - before, "species placed");
    }
    out
}

/// Instances plus their precomputed model matrices.
///
/// Placements never change after startup, so transforms are computed once.
#[derive(Debug, Clone, Default)]
pub struct SceneLayout {
    instances: Vec<ModelInstance>,
    transforms: Vec<Mat4>,
}

impl SceneLayout {
    pub fn new(species: &[SpeciesPlacement]) -> Self {
        let instances = build_layout(species);
        let transforms = instances.iter().map(ModelInstance::transform).collect();
        Self {
            instances,
            transforms,
        }
    }

    pub fn instances(&self) -> &[ModelInstance] {
        &self.instances
    }

    pub fn transforms(&self) -> &[Mat4] {
        &self.transforms
    }

    /// Instances paired with their transforms, in draw order.
    pub fn iter(&self) -> impl Iterator<Item = (&ModelInstance, &Mat4)> {
        self.instances.iter().zip(&self.transforms)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Number of instances that use `model`.
    pub fn count_for(&self, model: ModelHandle) -> usize {
        self.instances.iter().filter(|i| i.model == model).count()
    }
}
