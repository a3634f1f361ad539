use glam::{Vec3, Vec4};

use crate::math::Color;

#[derive(Debug, Clone, Copy)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

/// Cone light in the style of a stage spot: full strength inside
/// `angle * (1 - penumbra)`, fading to nothing at `angle`.
#[derive(Debug, Clone, Copy)]
pub struct SpotLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
    /// Half angle of the outer cone, radians.
    pub angle: f32,
    pub penumbra: f32,
    pub decay: f32,
    /// Range past which the light contributes nothing. Zero means unlimited.
    pub distance: f32,
}

impl SpotLight {
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or(Vec3::NEG_Y)
    }

    pub fn inner_cos(&self) -> f32 {
        (self.angle * (1.0 - self.penumbra.clamp(0.0, 1.0))).cos()
    }

    pub fn outer_cos(&self) -> f32 {
        self.angle.cos()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Lighting {
    pub ambient: AmbientLight,
    pub spot: SpotLight,
}

/// GPU layout of [`Lighting`]. Must match `Lights` in `scene.wgsl`.
#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable, Default)]
pub struct LightUniform {
    /// Premultiplied ambient colour.
    ambient: Vec4,
    /// xyz position, w range.
    spot_position: Vec4,
    /// xyz direction, w outer cone cosine.
    spot_direction: Vec4,
    /// Premultiplied colour, w inner cone cosine.
    spot_color: Vec4,
    /// x decay exponent.
    spot_params: Vec4,
}

impl LightUniform {
    pub fn new(lighting: &Lighting) -> Self {
        let Lighting { ambient, spot } = lighting;

        Self {
            ambient: (ambient.color.to_linear().truncate() * ambient.intensity).extend(1.0),
            spot_position: spot.position.extend(spot.distance),
            spot_direction: spot.direction().extend(spot.outer_cos()),
            spot_color: (spot.color.to_linear().truncate() * spot.intensity)
                .extend(spot.inner_cos()),
            spot_params: Vec4::new(spot.decay, 0.0, 0.0, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::f32::consts::PI;

    use super::*;

    fn spot() -> SpotLight {
        SpotLight {
            color: Color::WHITE,
            intensity: 5.0,
            position: Vec3::new(20.0, 10.0, -5.0),
            target: Vec3::new(0.0, 1.0, -5.0),
            angle: PI / 6.0,
            penumbra: 0.3,
            decay: 1.5,
            distance: 50.0,
        }
    }

    #[test]
    fn test_penumbra_narrows_inner_cone() {
        let spot = spot();
        assert!(spot.inner_cos() > spot.outer_cos());
        assert!((spot.inner_cos() - (PI / 6.0 * 0.7).cos()).abs() < 1e-6);
    }

    #[test]
    fn test_uniform_packs_light_parameters() {
        let lighting = Lighting {
            ambient: AmbientLight {
                color: Color::WHITE,
                intensity: 0.6,
            },
            spot: spot(),
        };

        let uniform = LightUniform::new(&lighting);

        assert!(uniform.ambient.abs_diff_eq(Vec4::new(0.6, 0.6, 0.6, 1.0), 1e-5));
        assert_eq!(uniform.spot_position, Vec4::new(20.0, 10.0, -5.0, 50.0));
        assert!(uniform.spot_direction.truncate().is_normalized());
        assert_eq!(uniform.spot_params.x, 1.5);
        assert_eq!(std::mem::size_of::<LightUniform>(), 80);
    }
}
