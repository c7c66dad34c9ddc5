use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Tuning for the fall event and the point-light orbit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventConfig {
    /// Event fires when `x² + z²` of the camera drops below this.
    pub trigger_distance_sq: f32,
    /// Seconds for the blend coefficient to ramp from 0 to 1.
    pub ramp_seconds: f32,
    /// Fraction of directional-light intensity removed at full blend.
    pub damping: f32,
    pub orbit_radius: f32,
    pub orbit_height: f32,
    /// Angular speed multiplier applied to time.
    pub orbit_rate: f32,
}

impl Default for EventConfig {
    fn default() -> Self {
        Self {
            trigger_distance_sq: 25.0,
            ramp_seconds: 7.0,
            damping: 5.0 / 7.0,
            orbit_radius: 7.0,
            orbit_height: 15.0,
            orbit_rate: 2.0,
        }
    }
}

/// Two-state event: dormant until the camera comes close, then triggered
/// for the rest of the session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EventState {
    trigger_time: Option<f32>,
}

impl EventState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triggered(&self) -> bool {
        self.trigger_time.is_some()
    }

    pub fn trigger_time(&self) -> Option<f32> {
        self.trigger_time
    }

    /// Sample the trigger condition. Returns `true` only on the call that
    /// flips the state.
    pub fn observe(&mut self, now: f32, camera: Vec3, config: &EventConfig) -> bool {
        if self.triggered() {
            return false;
        }
        if camera.x * camera.x + camera.z * camera.z < config.trigger_distance_sq {
            self.trigger_time = Some(now);
            return true;
        }
        false
    }

    /// Blend progress in `[0, 1]`: 0 while dormant, then a linear ramp.
    pub fn coefficient(&self, now: f32, config: &EventConfig) -> f32 {
        let Some(at) = self.trigger_time else {
            return 0.0;
        };
        let elapsed = now - at;
        if elapsed >= config.ramp_seconds {
            1.0
        } else {
            (elapsed / config.ramp_seconds).max(0.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn far_camera_stays_dormant() {
        let cfg = EventConfig::default();
        let mut ev = EventState::new();
        assert!(!ev.observe(1.0, Vec3::new(10.0, 10.0, 10.0), &cfg));
        assert!(!ev.triggered());
        assert_eq!(ev.coefficient(100.0, &cfg), 0.0);
    }

    #[test]
    fn boundary_is_exclusive() {
        let cfg = EventConfig::default();
        let mut ev = EventState::new();
        assert!(!ev.observe(0.0, Vec3::new(3.0, 0.0, 4.0), &cfg));
        assert!(ev.observe(0.0, Vec3::new(3.0, 0.0, 3.9), &cfg));
    }

    #[test]
    fn height_is_ignored() {
        let cfg = EventConfig::default();
        let mut ev = EventState::new();
        assert!(ev.observe(2.0, Vec3::new(0.0, 500.0, 1.0), &cfg));
        assert_eq!(ev.trigger_time(), Some(2.0));
    }

    #[test]
    fn trigger_is_irreversible_and_fires_once() {
        let cfg = EventConfig::default();
        let mut ev = EventState::new();
        assert!(ev.observe(4.0, Vec3::new(0.0, 10.0, 3.0), &cfg));
        assert!(!ev.observe(5.0, Vec3::new(0.0, 10.0, 3.0), &cfg));
        assert!(!ev.observe(6.0, Vec3::new(100.0, 0.0, 100.0), &cfg));
        assert!(ev.triggered());
        assert_eq!(ev.trigger_time(), Some(4.0));
    }

    #[test]
    fn coefficient_clamps() {
        let cfg = EventConfig::default();
        let mut ev = EventState::new();
        ev.observe(10.0, Vec3::ZERO, &cfg);
        assert_eq!(ev.coefficient(10.0, &cfg), 0.0);
        assert_eq!(ev.coefficient(9.0, &cfg), 0.0);
        assert_eq!(ev.coefficient(13.5, &cfg), 0.5);
        assert_eq!(ev.coefficient(17.0, &cfg), 1.0);
        assert_eq!(ev.coefficient(1000.0, &cfg), 1.0);
    }

    #[test]
    fn coefficient_is_non_decreasing() {
        let cfg = EventConfig::default();
        let mut ev = EventState::new();
        ev.observe(0.0, Vec3::ZERO, &cfg);
        let mut last = 0.0;
        for step in 0..200 {
            let c = ev.coefficient(step as f32 * 0.05, &cfg);
            assert!(c >= last);
            assert!((0.0..=1.0).contains(&c));
            last = c;
        }
    }
}
