use glam::Vec3;
use winit::keyboard::KeyCode;

use crate::camera::Camera;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct AxisKeys {
    positive: bool,
    negative: bool,
}

impl AxisKeys {
    fn value(&self) -> f32 {
        (self.positive as i8 - self.negative as i8) as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Forward,
    Right,
    Up,
}

/// Which directional keys are held, as one signed unit value per axis.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovementState {
    forward: AxisKeys,
    right: AxisKeys,
    up: AxisKeys,
}

impl MovementState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false for keys that don't move the camera.
    pub fn handle_key(&mut self, key: KeyCode, pressed: bool) -> bool {
        let (axis, positive) = match key {
            KeyCode::KeyW | KeyCode::ArrowUp => (Axis::Forward, true),
            KeyCode::KeyS | KeyCode::ArrowDown => (Axis::Forward, false),
            KeyCode::KeyD | KeyCode::ArrowRight => (Axis::Right, true),
            KeyCode::KeyA | KeyCode::ArrowLeft => (Axis::Right, false),
            KeyCode::KeyE | KeyCode::Space => (Axis::Up, true),
            KeyCode::KeyQ | KeyCode::ControlLeft => (Axis::Up, false),
            _ => return false,
        };

        let keys = match axis {
            Axis::Forward => &mut self.forward,
            Axis::Right => &mut self.right,
            Axis::Up => &mut self.up,
        };

        if positive {
            keys.positive = pressed;
        } else {
            keys.negative = pressed;
        }

        true
    }

    /// Used when the window loses focus and key releases can no longer be observed.
    pub fn release_all(&mut self) {
        *self = Self::default();
    }

    pub fn forward(&self) -> f32 {
        self.forward.value()
    }

    pub fn right(&self) -> f32 {
        self.right.value()
    }

    pub fn up(&self) -> f32 {
        self.up.value()
    }

    pub fn is_idle(&self) -> bool {
        self.forward() == 0.0 && self.right() == 0.0 && self.up() == 0.0
    }

    /// This frame's displacement: camera forward and right, world up, each scaled by `step`.
    pub fn translation(&self, camera: &Camera, step: f32) -> Vec3 {
        if self.is_idle() {
            return Vec3::ZERO;
        }

        (camera.forward() * self.forward() + camera.right() * self.right() + Vec3::Y * self.up())
            * step
    }

    /// Moves the camera and its orbit target together, so orbiting continues around the
    /// point in front of the camera.
    pub fn apply(&self, camera: &mut Camera, step: f32) {
        let translation = self.translation(camera, step);
        camera.eye += translation;
        camera.target += translation;
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::config::CameraConfig;

    fn camera() -> Camera {
        let config = CameraConfig {
            position: Vec3::new(0.0, 1.0, 10.0),
            target: Vec3::new(0.0, 1.0, 0.0),
            ..Default::default()
        };
        Camera::from_config(&config, 1.0)
    }

    #[test]
    fn test_held_keys_set_axes() {
        let mut movement = MovementState::new();
        assert!(movement.handle_key(KeyCode::KeyW, true));
        assert!(movement.handle_key(KeyCode::KeyA, true));
        assert!(movement.handle_key(KeyCode::Space, true));
        assert!(!movement.handle_key(KeyCode::KeyP, true));

        assert_eq!(movement.forward(), 1.0);
        assert_eq!(movement.right(), -1.0);
        assert_eq!(movement.up(), 1.0);
    }

    #[test]
    fn test_opposite_keys_cancel() {
        let mut movement = MovementState::new();
        movement.handle_key(KeyCode::KeyW, true);
        movement.handle_key(KeyCode::ArrowDown, true);
        assert_eq!(movement.forward(), 0.0);

        movement.handle_key(KeyCode::KeyW, false);
        assert_eq!(movement.forward(), -1.0);
    }

    #[test]
    fn test_releasing_all_keys_stops_translation() {
        let mut camera = camera();
        let mut movement = MovementState::new();

        movement.handle_key(KeyCode::KeyW, true);
        movement.handle_key(KeyCode::KeyD, true);
        movement.handle_key(KeyCode::KeyE, true);
        movement.apply(&mut camera, 0.1);
        assert_ne!(camera.eye, Vec3::new(0.0, 1.0, 10.0));

        movement.handle_key(KeyCode::KeyW, false);
        movement.handle_key(KeyCode::KeyD, false);
        movement.handle_key(KeyCode::KeyE, false);
        assert!(movement.is_idle());

        let eye = camera.eye;
        movement.apply(&mut camera, 0.1);
        assert_eq!(camera.eye, eye);
    }

    #[test]
    fn test_forward_moves_eye_and_target_along_view() {
        let mut camera = camera();
        let mut movement = MovementState::new();
        movement.handle_key(KeyCode::KeyW, true);

        movement.apply(&mut camera, 0.5);

        assert!(camera.eye.abs_diff_eq(Vec3::new(0.0, 1.0, 9.5), 1e-5));
        assert!(camera.target.abs_diff_eq(Vec3::new(0.0, 1.0, -0.5), 1e-5));
    }

    #[test]
    fn test_release_all() {
        let mut movement = MovementState::new();
        movement.handle_key(KeyCode::KeyQ, true);
        movement.release_all();
        assert!(movement.is_idle());
    }
}
