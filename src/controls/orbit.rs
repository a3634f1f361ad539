use std::f32::consts::PI;

use glam::{Vec2, Vec3};

use crate::camera::Camera;
use crate::config::ControlsConfig;

const MIN_POLAR: f32 = 1e-4;
const MAX_POLAR: f32 = PI - 1e-4;
const MIN_DISTANCE: f32 = 1e-3;
const ZOOM_BASE: f32 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragMode {
    Rotate,
    Pan,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
struct SphericalDelta {
    /// Around the world Y axis.
    theta: f32,
    /// Away from the world Y axis.
    phi: f32,
}

/// Orbits the camera eye around its target with damped rotation, dolly and pan.
///
/// Input accumulates into pending deltas. Each [`update`](Self::update) applies a
/// `damping_factor` share of them and decays the remainder, so motion eases out after the
/// pointer is released.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    damping_factor: f32,
    rotate_speed: f32,
    zoom_speed: f32,
    pan_speed: f32,

    spherical_delta: SphericalDelta,
    scale: f32,
    pan_offset: Vec3,
    drag: Option<DragMode>,
}

impl OrbitControls {
    pub fn new(config: &ControlsConfig) -> Self {
        Self {
            damping_factor: config.damping_factor.clamp(0.0, 1.0),
            rotate_speed: config.rotate_speed,
            zoom_speed: config.zoom_speed,
            pan_speed: config.pan_speed,
            spherical_delta: SphericalDelta::default(),
            scale: 1.0,
            pan_offset: Vec3::ZERO,
            drag: None,
        }
    }

    pub fn begin_drag(&mut self, mode: DragMode) {
        self.drag = Some(mode);
    }

    pub fn end_drag(&mut self) {
        self.drag = None;
    }

    /// Feeds a pointer movement in physical pixels into the active drag, if any.
    pub fn drag(&mut self, delta: Vec2, viewport: Vec2, camera: &Camera) {
        match self.drag {
            Some(DragMode::Rotate) => self.rotate(delta, viewport),
            Some(DragMode::Pan) => self.pan(delta, viewport, camera),
            None => {}
        }
    }

    pub fn rotate(&mut self, delta: Vec2, viewport: Vec2) {
        if viewport.y <= 0.0 {
            return;
        }

        // A drag across the full viewport height is one full turn.
        let angle = 2.0 * PI * delta / viewport.y * self.rotate_speed;
        self.spherical_delta.theta -= angle.x;
        self.spherical_delta.phi -= angle.y;
    }

    /// Positive steps move the camera towards the target.
    pub fn zoom(&mut self, steps: f32) {
        self.scale *= ZOOM_BASE.powf(self.zoom_speed * steps);
    }

    pub fn pan(&mut self, delta: Vec2, viewport: Vec2, camera: &Camera) {
        if viewport.y <= 0.0 {
            return;
        }

        // Scale so that the point under the cursor at the target's depth follows the cursor.
        let target_distance = (camera.eye - camera.target).length() * (camera.fov_y * 0.5).tan();
        let scale = 2.0 * target_distance / viewport.y * self.pan_speed;

        let right = camera.right();
        let up = right.cross(camera.forward());

        self.pan_offset += -right * delta.x * scale + up * delta.y * scale;
    }

    /// Applies one frame of pending motion to the camera. Returns whether the eye moved.
    pub fn update(&mut self, camera: &mut Camera) -> bool {
        let offset = camera.eye - camera.target;
        let radius = offset.length();

        let (theta, phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, PI * 0.5)
        };

        let theta = theta + self.spherical_delta.theta * self.damping_factor;
        let phi = (phi + self.spherical_delta.phi * self.damping_factor).clamp(MIN_POLAR, MAX_POLAR);
        let radius = (radius * self.scale).max(MIN_DISTANCE);

        camera.target += self.pan_offset * self.damping_factor;

        let offset = Vec3::new(
            radius * phi.sin() * theta.sin(),
            radius * phi.cos(),
            radius * phi.sin() * theta.cos(),
        );

        let previous_eye = camera.eye;
        camera.eye = camera.target + offset;

        let decay = 1.0 - self.damping_factor;
        self.spherical_delta.theta *= decay;
        self.spherical_delta.phi *= decay;
        self.pan_offset *= decay;
        self.scale = 1.0;

        previous_eye.distance_squared(camera.eye) > 1e-12
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CameraConfig;

    fn camera() -> Camera {
        let config = CameraConfig {
            position: Vec3::new(0.0, 0.0, 10.0),
            target: Vec3::ZERO,
            ..Default::default()
        };
        Camera::from_config(&config, 1.0)
    }

    #[test]
    fn test_idle_controls_keep_camera_still() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&ControlsConfig::default());

        assert!(!controls.update(&mut camera));
        assert!(camera.eye.abs_diff_eq(Vec3::new(0.0, 0.0, 10.0), 1e-4));
    }

    #[test]
    fn test_rotation_eases_towards_full_delta() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&ControlsConfig::default());
        let viewport = Vec2::new(800.0, 800.0);

        // A quarter of the viewport height is a quarter turn.
        controls.rotate(Vec2::new(200.0, 0.0), viewport);

        controls.update(&mut camera);
        let first_step = camera.eye;
        assert!(first_step.x < 0.0);
        assert!(first_step.x.abs() < 1.0);

        for _ in 0..1000 {
            controls.update(&mut camera);
        }

        assert!(camera.eye.abs_diff_eq(Vec3::new(-10.0, 0.0, 0.0), 1e-2));
        assert!((camera.eye.length() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_polar_angle_is_clamped() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&ControlsConfig {
            damping_factor: 1.0,
            ..Default::default()
        });

        controls.rotate(Vec2::new(0.0, 10_000.0), Vec2::new(100.0, 100.0));
        controls.update(&mut camera);

        assert!(camera.eye.y > 0.0);
        assert!(camera.eye.y.is_finite());
        assert!(camera.eye.x.abs() < 1e-2);
    }

    #[test]
    fn test_zoom_in_shortens_distance() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&ControlsConfig::default());

        controls.zoom(3.0);
        controls.update(&mut camera);

        let expected = 10.0 * 0.95f32.powi(3);
        assert!((camera.eye.length() - expected).abs() < 1e-3);

        // Zoom applies once, not on every following frame.
        controls.update(&mut camera);
        assert!((camera.eye.length() - expected).abs() < 1e-3);
    }

    #[test]
    fn test_pan_moves_target_and_eye_together() {
        let mut camera = camera();
        let mut controls = OrbitControls::new(&ControlsConfig::default());

        controls.begin_drag(DragMode::Pan);
        controls.drag(Vec2::new(-100.0, 0.0), Vec2::new(800.0, 800.0), &camera);
        controls.end_drag();
        assert!(controls.drag.is_none());

        for _ in 0..500 {
            controls.update(&mut camera);
        }

        // Dragging left pulls the view right.
        assert!(camera.target.x > 0.0);
        assert!((camera.eye - camera.target).abs_diff_eq(Vec3::new(0.0, 0.0, 10.0), 1e-3));
    }
}
