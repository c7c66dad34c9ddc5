//! The authored garden: which models exist, where they go, and how each
//! species is generated.

use crate::layout::{FixedPlacement, MirroredPlacement, PlacementRule, SpeciesPlacement};
use fallgarden_common::ModelHandle;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Every model the garden uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    AppleTree,
    OakTree,
    HazelnutBush,
    Tree3,
    Flower,
    Rose,
    Grass,
    /// Statue drawn at the point light; not part of the static layout.
    Angel,
}

impl Species {
    pub const ALL: [Species; 8] = [
        Species::AppleTree,
        Species::OakTree,
        Species::HazelnutBush,
        Species::Tree3,
        Species::Flower,
        Species::Rose,
        Species::Grass,
        Species::Angel,
    ];

    /// Model file, relative to the resources directory.
    pub fn model_path(self) -> &'static str {
        match self {
            Species::AppleTree => "objects/apple_tree/apple_tree.obj",
            Species::OakTree => "objects/tree2/Tree.obj",
            Species::HazelnutBush => "objects/hazelnut_bush/Hazelnut.obj",
            Species::Tree3 => "objects/tree3/Tree.obj",
            Species::Flower => "objects/flower1/marigold.obj",
            Species::Rose => "objects/rose/rose.obj",
            Species::Grass => "objects/grass/10450_Rectangular_Grass_Patch_v1_iterations-2.obj",
            Species::Angel => "objects/Angel/18343_Angel_v1.obj",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Species::AppleTree => "apple tree",
            Species::OakTree => "oak tree",
            Species::HazelnutBush => "hazelnut bush",
            Species::Tree3 => "tree3",
            Species::Flower => "flower",
            Species::Rose => "rose",
            Species::Grass => "grass",
            Species::Angel => "angel",
        }
    }
}

pub const FLOWER_COORDINATES: [Vec3; 8] = [
    Vec3::new(-5.0, 1.2, 5.0),
    Vec3::new(-10.0, 1.2, 2.0),
    Vec3::new(-20.0, 1.2, -3.0),
    Vec3::new(-5.0, 1.2, -15.0),
    Vec3::new(5.0, 1.2, -12.0),
    Vec3::new(-12.0, 1.2, -5.0),
    Vec3::new(6.0, 1.2, 5.0),
    Vec3::new(-5.0, 1.2, 13.0),
];

pub const ROSE_COORDINATES: [Vec3; 9] = [
    Vec3::new(-5.0, 1.2, -5.0),
    Vec3::new(-10.0, 1.2, -2.0),
    Vec3::new(20.0, 1.2, 3.0),
    Vec3::new(-5.0, 1.2, 15.0),
    Vec3::new(-5.0, 1.2, 12.0),
    Vec3::new(12.0, 1.2, 5.0),
    Vec3::new(6.0, 1.2, -5.0),
    Vec3::new(5.0, 1.2, -13.0),
    Vec3::new(15.0, 1.2, -18.0),
];

/// Generation rule for a species; `None` for models outside the static layout.
pub fn rule(species: Species) -> Option<PlacementRule> {
    let rule = match species {
        Species::AppleTree => PlacementRule::Fixed(vec![FixedPlacement::new(
            0.0,
            Vec3::X,
            20.0,
            Vec3::new(0.0, 6.3, -6.5),
        )]),
        Species::OakTree => PlacementRule::Fixed(vec![
            FixedPlacement::new(0.0, Vec3::Y, 3.0, Vec3::new(10.0, 1.5, 15.0)),
            FixedPlacement::new(-30.0, Vec3::Y, 3.5, Vec3::new(17.0, 1.5, -2.0)),
            FixedPlacement::new(30.0, Vec3::Y, 2.5, Vec3::new(20.0, 1.5, 7.0)),
        ]),
        Species::HazelnutBush => PlacementRule::Fixed(vec![FixedPlacement::new(
            0.0,
            Vec3::ZERO,
            0.7,
            Vec3::new(-10.0, 0.0, -10.0),
        )]),
        Species::Tree3 => PlacementRule::Fixed(vec![
            FixedPlacement::new(0.0, Vec3::ONE, 2.7, Vec3::new(20.0, 2.0, -20.0)),
            FixedPlacement::new(0.0, Vec3::ONE, 2.25, Vec3::new(12.0, 2.0, -16.0)),
        ]),
        Species::Flower => PlacementRule::Mirrored(MirroredPlacement {
            positions: FLOWER_COORDINATES.to_vec(),
            rotation_angle: -90.0,
            axis_wobble: 0.18,
            base_scale: 0.06,
            scale_jitter: 0.015,
        }),
        Species::Rose => PlacementRule::Mirrored(MirroredPlacement {
            positions: ROSE_COORDINATES.to_vec(),
            rotation_angle: 0.0,
            axis_wobble: 0.18,
            base_scale: 0.03,
            scale_jitter: 0.008,
        }),
        Species::Grass => PlacementRule::Fixed(vec![FixedPlacement::new(
            -90.0,
            Vec3::X,
            0.2,
            Vec3::ZERO,
        )]),
        Species::Angel => return None,
    };
    Some(rule)
}

/// Placements for every species that has a loaded model, in draw order.
///
/// Species missing from `models` (failed loads) are skipped.
pub fn placements(models: &BTreeMap<Species, ModelHandle>) -> Vec<SpeciesPlacement> {
    Species::ALL
        .into_iter()
        .filter_map(|species| {
            let rule = rule(species)?;
            let Some(&model) = models.get(&species) else {
                tracing::debug!("skipping {}: model not loaded", species.name());
                return None;
            };
            Some(SpeciesPlacement {
                model,
                rule,
                cull_back_faces: species == Species::Grass,
            })
        })
        .collect()
}
