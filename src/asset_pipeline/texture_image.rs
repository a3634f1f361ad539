use std::path::Path;

/// Decoded RGBA8 pixels, ready to be uploaded to the GPU.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum TextureImageError {
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("unsupported glTF image format {0:?}")]
    UnsupportedFormat(gltf::image::Format),
}

impl TextureImage {
    pub fn from_path(path: &Path) -> Result<Self, TextureImageError> {
        let image = image::open(path).map_err(|source| TextureImageError::Decode {
            path: path.display().to_string(),
            source,
        })?;

        Ok(Self::from_dynamic(image))
    }

    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self, TextureImageError> {
        let image =
            image::load_from_memory(bytes).map_err(|source| TextureImageError::Decode {
                path: name.to_string(),
                source,
            })?;

        Ok(Self::from_dynamic(image))
    }

    fn from_dynamic(image: image::DynamicImage) -> Self {
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();

        Self {
            width,
            height,
            pixels: rgba.into_raw(),
        }
    }

    pub fn from_gltf(data: gltf::image::Data) -> Result<Self, TextureImageError> {
        use gltf::image::Format;

        let pixels = match data.format {
            Format::R8G8B8A8 => data.pixels,
            Format::R8G8B8 => data
                .pixels
                .chunks_exact(3)
                .flat_map(|pixel| [pixel[0], pixel[1], pixel[2], 255])
                .collect(),
            Format::R8G8 => data
                .pixels
                .chunks_exact(2)
                .flat_map(|pixel| [pixel[0], pixel[1], 0, 255])
                .collect(),
            Format::R8 => data
                .pixels
                .iter()
                .flat_map(|&value| [value, value, value, 255])
                .collect(),
            other => return Err(TextureImageError::UnsupportedFormat(other)),
        };

        Ok(Self {
            width: data.width,
            height: data.height,
            pixels,
        })
    }

    /// Levels in a full mip chain, down to 1x1.
    pub fn mip_level_count(&self) -> u32 {
        u32::BITS - self.width.max(self.height).max(1).leading_zeros()
    }

    /// Every level after the base one, each a filtered half-size copy of the previous.
    pub fn downsampled_mips(&self) -> Vec<TextureImage> {
        let Some(base) = image::ImageBuffer::<image::Rgba<u8>, &[u8]>::from_raw(
            self.width,
            self.height,
            &self.pixels,
        ) else {
            log::warn!(
                "{}x{} image has {} bytes, skipping mipmaps",
                self.width,
                self.height,
                self.pixels.len()
            );
            return Vec::new();
        };

        let mut mips: Vec<image::RgbaImage> = Vec::new();
        for _ in 1..self.mip_level_count() {
            let next = match mips.last() {
                Some(previous) => half_size(previous),
                None => half_size(&base),
            };
            mips.push(next);
        }

        mips.into_iter().map(|mip| Self::from_dynamic(mip.into())).collect()
    }

    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
        }
    }
}

fn half_size<I>(image: &I) -> image::RgbaImage
where
    I: image::GenericImageView<Pixel = image::Rgba<u8>>,
{
    let (width, height) = image.dimensions();
    image::imageops::resize(
        image,
        (width / 2).max(1),
        (height / 2).max(1),
        image::imageops::FilterType::Triangle,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgb_gltf_image_gets_opaque_alpha() {
        let data = gltf::image::Data {
            pixels: vec![1, 2, 3, 4, 5, 6],
            format: gltf::image::Format::R8G8B8,
            width: 2,
            height: 1,
        };

        let image = TextureImage::from_gltf(data).unwrap();
        assert_eq!(image.pixels, vec![1, 2, 3, 255, 4, 5, 6, 255]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = TextureImage::from_path(Path::new("does/not/exist.jpg"));
        assert!(matches!(result, Err(TextureImageError::Decode { .. })));
    }

    #[test]
    fn test_garbage_bytes_are_an_error() {
        assert!(TextureImage::from_bytes("cake.jpg", b"not an image").is_err());
    }

    #[test]
    fn test_mip_chain_halves_down_to_one_pixel() {
        let image = TextureImage {
            width: 8,
            height: 4,
            pixels: [200, 100, 50, 255].repeat(32),
        };
        assert_eq!(image.mip_level_count(), 4);

        let mips = image.downsampled_mips();
        let sizes: Vec<(u32, u32)> = mips.iter().map(|mip| (mip.width, mip.height)).collect();
        assert_eq!(sizes, vec![(4, 2), (2, 1), (1, 1)]);

        for mip in &mips {
            assert_eq!(mip.pixels.len(), (mip.width * mip.height * 4) as usize);
            assert_eq!(&mip.pixels[..4], &[200, 100, 50, 255]);
        }
    }

    #[test]
    fn test_single_pixel_has_no_extra_mips() {
        let image = TextureImage::solid([255, 255, 255, 255]);
        assert_eq!(image.mip_level_count(), 1);
        assert!(image.downsampled_mips().is_empty());
    }
}
