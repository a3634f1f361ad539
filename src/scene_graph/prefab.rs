use glam::{Quat, Vec3};

use crate::{
    asset_pipeline::materials::MaterialData,
    material_manager::read_gltf_materials,
    model::{Buffers, MeshError, Model},
};

/// A node tree read from a model file, not yet attached to any scene. Built off the main
/// thread; [`Scene::spawn_prefab`](super::Scene::spawn_prefab) turns it into objects.
pub struct Prefab {
    pub name: String,
    pub nodes: Vec<PrefabNode>,
    pub roots: Vec<usize>,
    pub meshes: Vec<PrefabMesh>,
    pub materials: Vec<MaterialData>,
}

pub struct PrefabNode {
    pub name: String,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: f32,
    pub mesh: Option<usize>,
    pub children: Vec<usize>,
}

impl PrefabNode {
    pub fn new(name: impl Into<String>, translation: Vec3) -> Self {
        Self {
            name: name.into(),
            translation,
            rotation: Quat::IDENTITY,
            scale: 1.0,
            mesh: None,
            children: Vec::new(),
        }
    }
}

pub struct PrefabMesh {
    pub model: Model,
    /// Index into [`Prefab::materials`] for each primitive of `model`.
    pub primitive_materials: Vec<Option<usize>>,
}

impl Prefab {
    pub fn from_gltf(
        name: impl Into<String>,
        document: &gltf::Document,
        buffers: Buffers,
        images: &[gltf::image::Data],
    ) -> Result<Prefab, MeshError> {
        let name = name.into();

        let meshes = document
            .meshes()
            .map(|mesh| {
                let mesh_name = mesh
                    .name()
                    .map(String::from)
                    .unwrap_or_else(|| format!("{} (mesh {})", name, mesh.index()));
                let (model, primitive_materials) = Model::from_gltf(mesh_name, mesh, buffers)?;

                Ok(PrefabMesh {
                    model,
                    primitive_materials,
                })
            })
            .collect::<Result<Vec<_>, MeshError>>()?;

        // glTF node indices are dense, so they double as prefab node indices.
        let nodes = document
            .nodes()
            .map(|node| {
                let (translation, rotation, scale) = node.transform().decomposed();

                PrefabNode {
                    name: node.name().unwrap_or("Unnamed").to_string(),
                    translation: translation.into(),
                    rotation: Quat::from_array(rotation),
                    // Assume uniform scale
                    scale: scale[0],
                    mesh: node.mesh().map(|mesh| mesh.index()),
                    children: node.children().map(|child| child.index()).collect(),
                }
            })
            .collect();

        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next());
        let roots = scene
            .map(|scene| scene.nodes().map(|node| node.index()).collect())
            .unwrap_or_default();

        Ok(Prefab {
            name,
            nodes,
            roots,
            meshes,
            materials: read_gltf_materials(document, images),
        })
    }
}
