/// Camera translation directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CameraMovement {
    Forward,
    Backward,
    Left,
    Right,
}

impl CameraMovement {
    pub const ALL: [CameraMovement; 4] = [
        CameraMovement::Forward,
        CameraMovement::Backward,
        CameraMovement::Left,
        CameraMovement::Right,
    ];

    fn bit(self) -> u8 {
        match self {
            CameraMovement::Forward => 1,
            CameraMovement::Backward => 2,
            CameraMovement::Left => 4,
            CameraMovement::Right => 8,
        }
    }
}

/// A high-level action produced from raw window input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// Start or stop moving in a direction.
    Move {
        direction: CameraMovement,
        pressed: bool,
    },
    /// Mouse-look offset; `dy` is positive upwards.
    Look { dx: f32, dy: f32 },
    /// Scroll offset; positive zooms in.
    Zoom(f32),
    /// Show or hide the debug overlay.
    ToggleOverlay,
    Quit,
    /// Unbound input.
    Noop,
}

/// Set of movement keys currently held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeldMovement(u8);

impl HeldMovement {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, direction: CameraMovement, pressed: bool) {
        if pressed {
            self.0 |= direction.bit();
        } else {
            self.0 &= !direction.bit();
        }
    }

    pub fn is_held(&self, direction: CameraMovement) -> bool {
        self.0 & direction.bit() != 0
    }

    pub fn count(&self) -> u32 {
        self.0.count_ones()
    }

    pub fn active(&self) -> impl Iterator<Item = CameraMovement> + '_ {
        CameraMovement::ALL.into_iter().filter(|d| self.is_held(*d))
    }

    /// Per-direction step factor: `1 / sqrt(held count)`.
    pub fn step_scale(&self) -> f32 {
        match self.count() {
            0 => 0.0,
            n => 1.0 / (n as f32).sqrt(),
        }
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_and_release() {
        let mut held = HeldMovement::new();
        held.set(CameraMovement::Forward, true);
        held.set(CameraMovement::Left, true);
        assert_eq!(held.count(), 2);
        held.set(CameraMovement::Forward, false);
        assert!(!held.is_held(CameraMovement::Forward));
        assert!(held.is_held(CameraMovement::Left));
    }

    #[test]
    fn repeated_press_counts_once() {
        let mut held = HeldMovement::new();
        held.set(CameraMovement::Right, true);
        held.set(CameraMovement::Right, true);
        assert_eq!(held.count(), 1);
        assert_eq!(held.step_scale(), 1.0);
    }

    #[test]
    fn step_scale_normalizes_diagonals() {
        let mut held = HeldMovement::new();
        assert_eq!(held.step_scale(), 0.0);
        held.set(CameraMovement::Forward, true);
        held.set(CameraMovement::Right, true);
        assert!((held.step_scale() - std::f32::consts::FRAC_1_SQRT_2).abs() < 1e-6);
    }

    #[test]
    fn active_lists_held_in_fixed_order() {
        let mut held = HeldMovement::new();
        held.set(CameraMovement::Right, true);
        held.set(CameraMovement::Backward, true);
        let active: Vec<_> = held.active().collect();
        assert_eq!(active, vec![CameraMovement::Backward, CameraMovement::Right]);
    }

    #[test]
    fn action_variants() {
        assert!(matches!(Action::Zoom(1.0), Action::Zoom(_)));
        assert_ne!(Action::Quit, Action::ToggleOverlay);
    }
}
