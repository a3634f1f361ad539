use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec4};
use wgpu::util::DeviceExt;

use crate::asset_pipeline::{materials::MaterialData, texture_image::TextureImage};
use crate::material_manager::{MaterialId, MaterialManager};
use crate::rendering::texture::create_texture_from_image;

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct MaterialUniform {
    color: Vec4,
    uv_repeat: Vec2,
    roughness: f32,
    metalness: f32,
}

impl MaterialUniform {
    fn new(material: &MaterialData) -> Self {
        Self {
            color: material.color,
            uv_repeat: material.uv_repeat,
            roughness: material.roughness_factor,
            metalness: material.metalness_factor,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextureType {
    BaseColor,
    Normal,
    Roughness,
    AmbientOcclusion,
}

impl TextureType {
    const ALL: [TextureType; 4] = [
        TextureType::BaseColor,
        TextureType::Normal,
        TextureType::Roughness,
        TextureType::AmbientOcclusion,
    ];

    fn format(self) -> wgpu::TextureFormat {
        match self {
            TextureType::BaseColor => wgpu::TextureFormat::Rgba8UnormSrgb,
            _ => wgpu::TextureFormat::Rgba8Unorm,
        }
    }

    /// Texel that leaves the material unchanged when a map is missing.
    fn neutral_texel(self) -> [u8; 4] {
        match self {
            TextureType::Normal => [128, 128, 255, 255],
            _ => [255, 255, 255, 255],
        }
    }

    fn binding(self) -> u32 {
        match self {
            TextureType::BaseColor => 1,
            TextureType::Normal => 2,
            TextureType::Roughness => 3,
            TextureType::AmbientOcclusion => 4,
        }
    }

    fn image(self, material: &MaterialData) -> Option<&TextureImage> {
        match self {
            TextureType::BaseColor => material.base_color.as_ref(),
            TextureType::Normal => material.normal.as_ref(),
            TextureType::Roughness => material.roughness.as_ref(),
            TextureType::AmbientOcclusion => material.ambient_occlusion.as_ref(),
        }
    }
}

struct RenderMaterial {
    _uniform_buffer: wgpu::Buffer,
    _textures: Vec<wgpu::Texture>,
    bind_group: wgpu::BindGroup,
}

/// GPU copies of materials, each with its own bind group (group 1 in the scene shader).
pub struct RenderMaterialManager {
    device: wgpu::Device,
    queue: wgpu::Queue,

    bind_group_layout: wgpu::BindGroupLayout,
    sampler: wgpu::Sampler,
    default_views: Vec<wgpu::TextureView>,

    default_material: RenderMaterial,
    materials: HashMap<MaterialId, RenderMaterial>,
}

impl RenderMaterialManager {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("Material sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            mipmap_filter: wgpu::FilterMode::Linear,
            lod_min_clamp: 0.0,
            lod_max_clamp: 32.0,
            compare: None,
            anisotropy_clamp: 16,
            border_color: None,
        });

        let texture_entry = |binding: u32| wgpu::BindGroupLayoutEntry {
            binding,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        };

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Material bind group layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                texture_entry(1),
                texture_entry(2),
                texture_entry(3),
                texture_entry(4),
                wgpu::BindGroupLayoutEntry {
                    binding: 5,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let default_views: Vec<_> = TextureType::ALL
            .into_iter()
            .map(|texture_type| {
                let image = TextureImage::solid(texture_type.neutral_texel());
                let label = format!("Default texture ({texture_type:?})");
                create_texture_from_image(device, queue, &image, texture_type.format(), &label)
                    .create_view(&wgpu::TextureViewDescriptor::default())
            })
            .collect();

        let default_material = create_material(
            device,
            queue,
            &bind_group_layout,
            &sampler,
            &default_views,
            &MaterialData::new("Default"),
        );

        Self {
            device: device.clone(),
            queue: queue.clone(),
            bind_group_layout,
            sampler,
            default_views,
            default_material,
            materials: HashMap::new(),
        }
    }

    pub fn bind_group_layout(&self) -> &wgpu::BindGroupLayout {
        &self.bind_group_layout
    }

    /// Uploads materials registered since the last call.
    pub fn sync(&mut self, material_manager: &MaterialManager) {
        for (id, material) in material_manager.iter() {
            if self.materials.contains_key(&id) {
                continue;
            }

            let render_material = create_material(
                &self.device,
                &self.queue,
                &self.bind_group_layout,
                &self.sampler,
                &self.default_views,
                material,
            );
            self.materials.insert(id, render_material);
            log::debug!("Uploaded material {}", material.name);
        }
    }

    /// The material's bind group, or a plain white material for primitives without one.
    pub fn bind_group(&self, id: Option<MaterialId>) -> &wgpu::BindGroup {
        id.and_then(|id| self.materials.get(&id))
            .map_or(&self.default_material.bind_group, |material| {
                &material.bind_group
            })
    }
}

fn create_material(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    layout: &wgpu::BindGroupLayout,
    sampler: &wgpu::Sampler,
    default_views: &[wgpu::TextureView],
    material: &MaterialData,
) -> RenderMaterial {
    let uniform_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some(&format!("Material uniform ({})", material.name)),
        contents: bytemuck::cast_slice(&[MaterialUniform::new(material)]),
        usage: wgpu::BufferUsages::UNIFORM,
    });

    let mut textures = Vec::new();
    let views: Vec<wgpu::TextureView> = TextureType::ALL
        .into_iter()
        .enumerate()
        .map(|(index, texture_type)| match texture_type.image(material) {
            Some(image) => {
                let label = format!("{} ({texture_type:?})", material.name);
                let texture = create_texture_from_image(
                    device,
                    queue,
                    image,
                    texture_type.format(),
                    &label,
                );
                let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
                textures.push(texture);
                view
            }
            None => default_views[index].clone(),
        })
        .collect();

    let mut entries = vec![wgpu::BindGroupEntry {
        binding: 0,
        resource: uniform_buffer.as_entire_binding(),
    }];
    entries.extend(
        TextureType::ALL
            .iter()
            .zip(&views)
            .map(|(texture_type, view)| wgpu::BindGroupEntry {
                binding: texture_type.binding(),
                resource: wgpu::BindingResource::TextureView(view),
            }),
    );
    entries.push(wgpu::BindGroupEntry {
        binding: 5,
        resource: wgpu::BindingResource::Sampler(sampler),
    });

    let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
        label: Some(&format!("Material bind group ({})", material.name)),
        layout,
        entries: &entries,
    });

    RenderMaterial {
        _uniform_buffer: uniform_buffer,
        _textures: textures,
        bind_group,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_uniform_matches_wgsl_layout() {
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 32);
    }

    #[test]
    fn test_missing_maps_are_neutral() {
        assert_eq!(TextureType::Normal.neutral_texel(), [128, 128, 255, 255]);
        assert_eq!(TextureType::BaseColor.neutral_texel(), [255, 255, 255, 255]);
        assert!(TextureType::BaseColor.format().is_srgb());
        assert!(!TextureType::Normal.format().is_srgb());
    }

    #[test]
    fn test_uniform_carries_uv_repeat() {
        let material = MaterialData::new("Wall").with_uv_repeat(Vec2::new(4.0, 2.0));
        let uniform = MaterialUniform::new(&material);

        assert_eq!(uniform.uv_repeat, Vec2::new(4.0, 2.0));
        assert_eq!(uniform.color, material.color);
    }
}
