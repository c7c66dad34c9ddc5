use crate::event::{EventConfig, EventState};
use crate::lights::{DirLight, PointLight, SpotLight};
use glam::{Mat4, Vec3};

/// Light values for one frame, ready for uniform upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameLighting {
    pub point: PointLight,
    pub dir: DirLight,
    pub spot: SpotLight,
    /// Skybox cross-fade and light damping progress.
    pub coef: f32,
    pub triggered: bool,
}

/// Owns the scene lights and the fall event for one session.
#[derive(Debug, Clone, Default)]
pub struct LightingRig {
    config: EventConfig,
    event: EventState,
    point: PointLight,
    dir_base: DirLight,
    spot_base: SpotLight,
}

impl LightingRig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EventConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &EventConfig {
        &self.config
    }

    pub fn event(&self) -> &EventState {
        &self.event
    }

    /// Authored point light; attenuation is tweakable from the overlay.
    pub fn point_light_mut(&mut self) -> &mut PointLight {
        &mut self.point
    }

    /// Point-light orbit position at time `seed`.
    pub fn orbit_position(&self, seed: f32) -> Vec3 {
        let angle = self.config.orbit_rate * seed;
        Vec3::new(
            self.config.orbit_radius * angle.sin(),
            self.config.orbit_height,
            self.config.orbit_radius * angle.cos(),
        )
    }

    /// Advance one frame.
    ///
    /// Samples the trigger first, so the frame that fires already sees the
    /// triggered lighting.
    pub fn update(&mut self, now: f32, camera: Vec3) -> FrameLighting {
        if self.event.observe(now, camera, &self.config) {
            tracing::info!(time = now, "fall of man");
        }

        let seed = self.event.trigger_time().unwrap_or(now);
        self.point.position = self.orbit_position(seed);
        tracing::trace!(
            "point light at ({:.3}, {:.3}, {:.3})",
            self.point.position.x,
            self.point.position.y,
            self.point.position.z
        );

        let coef = self.event.coefficient(now, &self.config);
        let triggered = self.event.triggered();

        let (dir, spot) = if triggered {
            let spot = SpotLight {
                position: self.point.position,
                direction: (camera - self.point.position).normalize(),
                diffuse: Vec3::X,
                specular: Vec3::new(0.4, 0.0, 0.0),
                ..self.spot_base
            };
            (self.dir_base.scaled(1.0 - self.config.damping * coef), spot)
        } else {
            (self.dir_base, self.spot_base)
        };

        FrameLighting {
            point: self.point,
            dir,
            spot,
            coef,
            triggered,
        }
    }
}

/// Model matrix of the statue that marks the point light.
///
/// Spins at 4 rad/s, plus 10 rad/s per second elapsed since the event.
pub fn light_marker_transform(position: Vec3, now: f32, event: &EventState) -> Mat4 {
    let extra = event.trigger_time().map_or(0.0, |at| 10.0 * (now - at));
    Mat4::from_translation(position)
        * Mat4::from_scale(Vec3::splat(0.3))
        * Mat4::from_rotation_y(4.0 * now + extra)
        * Mat4::from_rotation_x((-90.0_f32).to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEAR: Vec3 = Vec3::new(0.0, 10.0, 3.0);
    const FAR: Vec3 = Vec3::new(10.0, 10.0, 10.0);

    #[test]
    fn dormant_rig_keeps_authored_values() {
        let mut rig = LightingRig::new();
        for step in 0..10 {
            let frame = rig.update(step as f32 * 0.5, FAR);
            assert!(!frame.triggered);
            assert_eq!(frame.coef, 0.0);
            assert_eq!(frame.dir, DirLight::default());
            assert!(frame.spot.is_dark());
        }
    }

    #[test]
    fn point_light_orbits_while_dormant() {
        let mut rig = LightingRig::new();
        let a = rig.update(0.0, FAR).point.position;
        let b = rig.update(1.0, FAR).point.position;
        assert_eq!(a, Vec3::new(0.0, 15.0, 7.0));
        assert_ne!(a, b);
        assert!((b.x * b.x + b.z * b.z - 49.0).abs() < 1e-3);
    }

    #[test]
    fn near_camera_scenario() {
        let mut rig = LightingRig::new();
        let first = rig.update(2.0, NEAR);
        assert!(first.triggered);
        assert_eq!(rig.event().trigger_time(), Some(2.0));
        assert_eq!(first.coef, 0.0);

        let later = rig.update(5.5, NEAR);
        assert_eq!(later.coef, 0.5);
        let expected = Vec3::splat(0.25) * (1.0 - 2.5 / 7.0);
        assert!(later.dir.ambient.abs_diff_eq(expected, 1e-6));
        assert!(later.dir.diffuse.abs_diff_eq(Vec3::splat(0.4) * (1.0 - 2.5 / 7.0), 1e-6));
    }

    #[test]
    fn orbit_freezes_at_trigger() {
        let mut rig = LightingRig::new();
        let at_trigger = rig.update(3.0, NEAR).point.position;
        let after = rig.update(9.25, FAR).point.position;
        assert_eq!(at_trigger, after);
        assert_eq!(after, rig.orbit_position(3.0));
    }

    #[test]
    fn event_stays_triggered_when_camera_leaves() {
        let mut rig = LightingRig::new();
        rig.update(1.0, NEAR);
        for step in 2..20 {
            assert!(rig.update(step as f32, FAR).triggered);
        }
    }

    #[test]
    fn spot_tracks_point_light_and_aims_at_camera() {
        let mut rig = LightingRig::new();
        rig.update(0.0, NEAR);
        let camera = Vec3::new(2.0, 1.0, -1.0);
        let frame = rig.update(1.0, camera);
        assert_eq!(frame.spot.position, frame.point.position);
        let expected = (camera - frame.point.position).normalize();
        assert!(frame.spot.direction.abs_diff_eq(expected, 1e-6));
        assert_eq!(frame.spot.diffuse, Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(frame.spot.specular, Vec3::new(0.4, 0.0, 0.0));
        assert_eq!(frame.spot.ambient, Vec3::ZERO);
    }

    #[test]
    fn dir_light_holds_at_two_sevenths() {
        let mut rig = LightingRig::new();
        rig.update(0.0, NEAR);
        let frame = rig.update(50.0, FAR);
        assert_eq!(frame.coef, 1.0);
        let expected = Vec3::splat(0.25) * (2.0 / 7.0);
        assert!(frame.dir.ambient.abs_diff_eq(expected, 1e-6));
        assert_eq!(frame.dir.direction, DirLight::default().direction);
    }

    #[test]
    fn attenuation_edits_flow_into_frames() {
        let mut rig = LightingRig::new();
        rig.point_light_mut().quadratic = 0.5;
        assert_eq!(rig.update(0.0, FAR).point.quadratic, 0.5);
    }

    #[test]
    fn custom_config_changes_trigger_and_ramp() {
        let config = EventConfig {
            trigger_distance_sq: 400.0,
            ramp_seconds: 2.0,
            ..EventConfig::default()
        };
        let mut rig = LightingRig::with_config(config);
        assert_eq!(rig.config().ramp_seconds, 2.0);
        assert!(rig.update(0.0, FAR).triggered);
        assert_eq!(rig.update(1.0, FAR).coef, 0.5);
        assert_eq!(LightingRig::new().update(0.0, FAR).coef, 0.0);
    }

    #[test]
    fn nan_camera_does_not_panic() {
        let mut rig = LightingRig::new();
        let frame = rig.update(1.0, Vec3::NAN);
        assert!(!frame.triggered);
    }

    #[test]
    fn marker_spins_faster_after_event() {
        let dormant = EventState::new();
        let mut triggered = EventState::new();
        triggered.observe(1.0, Vec3::ZERO, &EventConfig::default());

        let pos = Vec3::new(0.0, 15.0, 7.0);
        let a = light_marker_transform(pos, 2.0, &dormant);
        let b = light_marker_transform(pos, 2.0, &triggered);
        assert_ne!(a, b);
        assert_eq!(a.w_axis.truncate(), pos);
        assert_eq!(b.w_axis.truncate(), pos);
    }
}
