use std::collections::HashMap;

use id_arena::{Arena, Id};

use crate::asset_pipeline::{materials::MaterialData, texture_image::TextureImage};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GltfMaterialKey {
    pub file_name: String,
    pub material_index: usize,
}

pub type MaterialId = Id<MaterialData>;

pub struct MaterialManager {
    materials: Arena<MaterialData>,
    materials_by_gltf: HashMap<GltfMaterialKey, MaterialId>,
}

impl MaterialManager {
    pub fn new() -> Self {
        Self {
            materials: Arena::new(),
            materials_by_gltf: HashMap::new(),
        }
    }

    pub fn add_material(&mut self, material_data: MaterialData) -> MaterialId {
        self.materials.alloc(material_data)
    }

    /// Registers a material read from a glTF file once; repeated registrations of the same
    /// file/material pair return the existing id.
    pub fn add_gltf_material(
        &mut self,
        file_name: &str,
        material_index: usize,
        material_data: MaterialData,
    ) -> MaterialId {
        let key = GltfMaterialKey {
            file_name: file_name.to_string(),
            material_index,
        };

        if let Some(id) = self.materials_by_gltf.get(&key) {
            return *id;
        }

        let id = self.add_material(material_data);
        self.materials_by_gltf.insert(key, id);
        id
    }

    pub fn get(&self, id: MaterialId) -> Option<&MaterialData> {
        self.materials.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &MaterialData)> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }
}

/// Reads every material of a glTF document, converting referenced images to RGBA8.
pub fn read_gltf_materials(
    document: &gltf::Document,
    images: &[gltf::image::Data],
) -> Vec<MaterialData> {
    document
        .materials()
        .map(|material| {
            let name = material.name().unwrap_or("Unnamed material");
            let pbr = material.pbr_metallic_roughness();

            let mut data = MaterialData::new(name);
            data.color = glam::Vec4::from_array(pbr.base_color_factor());
            data.roughness_factor = pbr.roughness_factor();
            data.metalness_factor = pbr.metallic_factor();
            data.base_color = pbr
                .base_color_texture()
                .and_then(|info| copy_image(images, info.texture().source().index(), name));
            data.roughness = pbr
                .metallic_roughness_texture()
                .and_then(|info| copy_image(images, info.texture().source().index(), name));
            data.normal = material
                .normal_texture()
                .and_then(|info| copy_image(images, info.texture().source().index(), name));
            data.ambient_occlusion = material
                .occlusion_texture()
                .and_then(|info| copy_image(images, info.texture().source().index(), name));
            data
        })
        .collect()
}

fn copy_image(
    images: &[gltf::image::Data],
    image_index: usize,
    material_name: &str,
) -> Option<TextureImage> {
    let Some(data) = images.get(image_index) else {
        log::warn!("{material_name}: glTF image index {image_index} out of bounds");
        return None;
    };

    // Materials may share an image, so each one gets its own copy.
    match TextureImage::from_gltf(data.clone()) {
        Ok(image) => Some(image),
        Err(e) => {
            log::warn!("{material_name}: {e}");
            None
        }
    }
}
