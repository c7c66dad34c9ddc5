use fallgarden_input::CameraMovement;
use glam::{Mat4, Vec3};

const NEAR: f32 = 0.1;
const FAR: f32 = 100.0;

/// Fly camera with Euler angles in degrees.
///
/// Camera motion is not deterministic; it lives outside the lighting state
/// and only its position is fed into it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlyCamera {
    pub position: Vec3,
    front: Vec3,
    up: Vec3,
    right: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub speed: f32,
    pub sensitivity: f32,
    /// Vertical field of view in degrees.
    pub zoom: f32,
}

impl Default for FlyCamera {
    fn default() -> Self {
        Self::new(Vec3::new(0.0, 0.0, 3.0))
    }
}

impl FlyCamera {
    pub fn new(position: Vec3) -> Self {
        let mut cam = Self {
            position,
            front: Vec3::NEG_Z,
            up: Vec3::Y,
            right: Vec3::X,
            yaw: -90.0,
            pitch: 0.0,
            speed: 2.5,
            sensitivity: 0.1,
            zoom: 45.0,
        };
        cam.update_vectors();
        cam
    }

    /// Camera at `position` looking along `front`.
    pub fn from_pose(position: Vec3, front: Vec3) -> Self {
        let mut cam = Self::new(position);
        let f = front.normalize_or(Vec3::NEG_Z);
        cam.yaw = f.z.atan2(f.x).to_degrees();
        cam.pitch = f.y.clamp(-1.0, 1.0).asin().to_degrees().clamp(-89.0, 89.0);
        cam.update_vectors();
        cam
    }

    pub fn front(&self) -> Vec3 {
        self.front
    }

    pub fn right(&self) -> Vec3 {
        self.right
    }

    /// Move along `direction`; `scale` shrinks the step when several keys are held.
    pub fn process_keyboard(&mut self, direction: CameraMovement, dt: f32, scale: f32) {
        let velocity = self.speed * dt * scale;
        match direction {
            CameraMovement::Forward => self.position += self.front * velocity,
            CameraMovement::Backward => self.position -= self.front * velocity,
            CameraMovement::Left => self.position -= self.right * velocity,
            CameraMovement::Right => self.position += self.right * velocity,
        }
    }

    /// Mouse look; `dy` is positive upwards. Pitch stays within ±89°.
    pub fn process_mouse_movement(&mut self, dx: f32, dy: f32) {
        self.yaw += dx * self.sensitivity;
        self.pitch = (self.pitch + dy * self.sensitivity).clamp(-89.0, 89.0);
        self.update_vectors();
    }

    pub fn process_scroll(&mut self, dy: f32) {
        self.zoom = (self.zoom - dy).clamp(1.0, 45.0);
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.position + self.front, self.up)
    }

    pub fn projection_matrix(&self, aspect: f32) -> Mat4 {
        Mat4::perspective_rh(self.zoom.to_radians(), aspect, NEAR, FAR)
    }

    fn update_vectors(&mut self) {
        let (yaw, pitch) = (self.yaw.to_radians(), self.pitch.to_radians());
        self.front = Vec3::new(yaw.cos() * pitch.cos(), pitch.sin(), yaw.sin() * pitch.cos())
            .normalize();
        self.right = self.front.cross(Vec3::Y).normalize();
        self.up = self.right.cross(self.front).normalize();
    }
}
