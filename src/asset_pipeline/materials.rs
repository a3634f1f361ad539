use glam::{Vec2, Vec4};

use crate::asset_pipeline::texture_image::TextureImage;
use crate::math::Color;

/// CPU-side description of a standard (metallic/roughness) material.
#[derive(Debug, Clone)]
pub struct MaterialData {
    pub name: String,
    /// Linear RGBA multiplier for the base colour.
    pub color: Vec4,
    pub base_color: Option<TextureImage>,
    pub normal: Option<TextureImage>,
    /// Roughness is read from the green channel, matching glTF's packed layout.
    pub roughness: Option<TextureImage>,
    pub ambient_occlusion: Option<TextureImage>,
    pub uv_repeat: Vec2,
    pub roughness_factor: f32,
    pub metalness_factor: f32,
}

impl MaterialData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: Vec4::ONE,
            base_color: None,
            normal: None,
            roughness: None,
            ambient_occlusion: None,
            uv_repeat: Vec2::ONE,
            roughness_factor: 1.0,
            metalness_factor: 0.0,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color.to_linear();
        self
    }

    pub fn with_uv_repeat(mut self, repeat: Vec2) -> Self {
        self.uv_repeat = repeat;
        self
    }
}
