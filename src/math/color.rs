use glam::Vec4;
use serde::{Deserialize, Serialize};

/// An sRGB colour as written in hex, e.g. `0xB57EDC`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub const WHITE: Color = Color(0xFFFFFF);

    pub fn r(self) -> u8 {
        (self.0 >> 16) as u8
    }

    pub fn g(self) -> u8 {
        (self.0 >> 8) as u8
    }

    pub fn b(self) -> u8 {
        self.0 as u8
    }

    /// Linear RGB with alpha 1.0, for use in shaders writing to an sRGB target.
    pub fn to_linear(self) -> Vec4 {
        Vec4::new(
            srgb_to_linear(self.r()),
            srgb_to_linear(self.g()),
            srgb_to_linear(self.b()),
            1.0,
        )
    }

    pub fn to_wgpu(self) -> wgpu::Color {
        let linear = self.to_linear();
        wgpu::Color {
            r: linear.x as f64,
            g: linear.y as f64,
            b: linear.z as f64,
            a: 1.0,
        }
    }
}

fn srgb_to_linear(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels() {
        let color = Color(0xB57EDC);
        assert_eq!((color.r(), color.g(), color.b()), (0xB5, 0x7E, 0xDC));
    }

    #[test]
    fn test_linear_endpoints() {
        assert_eq!(Color::WHITE.to_linear(), Vec4::ONE);
        assert_eq!(Color(0).to_linear(), Vec4::new(0.0, 0.0, 0.0, 1.0));
    }
}
