use fallgarden_common::ModelHandle;
use fallgarden_lighting::FrameLighting;
use fallgarden_render::SceneSession;
use fallgarden_scene::Species;
use glam::Vec3;
use std::fmt;

/// Read-only queries against a scene session.
pub struct SceneInspector;

impl SceneInspector {
    /// Summarize the layout and the lighting of the last rendered frame.
    pub fn summary(session: &SceneSession, lighting: &FrameLighting) -> SceneSummary {
        let species = Species::ALL
            .into_iter()
            .filter_map(|s| {
                let model = *session.assets().models.get(&s)?;
                Some(SpeciesCount {
                    species: s,
                    model,
                    instances: session.layout().count_for(model),
                })
            })
            .collect();

        SceneSummary {
            instances: session.layout().len(),
            species,
            triggered: lighting.triggered,
            trigger_time: session.rig().event().trigger_time(),
            coef: lighting.coef,
            point_position: lighting.point.position,
            dir_diffuse: lighting.dir.diffuse,
            spot_lit: !lighting.spot.is_dark(),
        }
    }

    /// Every placed instance of `species`, in draw order.
    pub fn instances_of(session: &SceneSession, species: Species) -> Vec<InstanceInfo> {
        let Some(model) = session.assets().models.get(&species).copied() else {
            return Vec::new();
        };
        session
            .layout()
            .instances()
            .iter()
            .filter(|inst| inst.model == model)
            .map(|inst| InstanceInfo {
                species,
                index: inst.instance_index,
                translation: inst.translation,
                scale: inst.scale.x,
                rotation_angle: inst.rotation_angle,
            })
            .collect()
    }
}

/// Instance count for one loaded species.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpeciesCount {
    pub species: Species,
    pub model: ModelHandle,
    pub instances: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneSummary {
    pub instances: usize,
    pub species: Vec<SpeciesCount>,
    pub triggered: bool,
    pub trigger_time: Option<f32>,
    pub coef: f32,
    pub point_position: Vec3,
    pub dir_diffuse: Vec3,
    pub spot_lit: bool,
}

impl fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scene: instances={}", self.instances)?;
        for s in &self.species {
            writeln!(f, "  {:<14} {} x{}", s.species.name(), s.model, s.instances)?;
        }
        let p = self.point_position;
        match self.trigger_time {
            Some(at) => writeln!(f, "Event: triggered at {at:.2}s coef={:.3}", self.coef)?,
            None => writeln!(f, "Event: waiting coef={:.3}", self.coef)?,
        }
        write!(
            f,
            "Lights: point=({:.2}, {:.2}, {:.2}) dir_diffuse={:.3} spot={}",
            p.x,
            p.y,
            p.z,
            self.dir_diffuse.x,
            if self.spot_lit { "on" } else { "off" }
        )
    }
}

/// One placed instance, as shown by the inspector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InstanceInfo {
    pub species: Species,
    pub index: Option<u32>,
    pub translation: Vec3,
    pub scale: f32,
    pub rotation_angle: f32,
}

impl fmt::Display for InstanceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let t = self.translation;
        write!(f, "{}", self.species.name())?;
        if let Some(i) = self.index {
            write!(f, "[{i}]")?;
        }
        write!(
            f,
            " pos=({:.2}, {:.2}, {:.2}) scale={:.4} angle={:.1}",
            t.x, t.y, t.z, self.scale, self.rotation_angle
        )
    }
}
