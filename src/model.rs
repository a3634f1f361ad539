use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};
use gltf::buffer;
use itertools::izip;

use crate::{material_manager::MaterialId, math::Aabb};

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coords: Vec2,
    pub tangent: Vec3,
}

pub struct ModelPrimitive {
    pub index: usize,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub material: Option<MaterialId>,
    pub bounding_box: Aabb,
}

impl ModelPrimitive {
    pub fn new(index: usize, vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        let bounding_box = Aabb::from_points(vertices.iter().map(|vertex| vertex.position));

        Self {
            index,
            vertices,
            indices,
            material: None,
            bounding_box,
        }
    }

    pub fn triangles(&self) -> impl Iterator<Item = [Vec3; 3]> + '_ {
        self.indices.chunks_exact(3).map(|triangle| {
            [
                self.vertices[triangle[0] as usize].position,
                self.vertices[triangle[1] as usize].position,
                self.vertices[triangle[2] as usize].position,
            ]
        })
    }

    pub(crate) fn vertex_by_triangle_index(&self, face: usize, vert: usize) -> &Vertex {
        &self.vertices[self.indices[face * 3 + vert] as usize]
    }

    pub(crate) fn vertex_by_triangle_index_mut(&mut self, face: usize, vert: usize) -> &mut Vertex {
        let index = self.indices[face * 3 + vert] as usize;
        &mut self.vertices[index]
    }

    /// Replaces normals with per-face normals. Only used when a mesh ships without any.
    fn generate_flat_normals(&mut self) {
        for triangle in self.indices.chunks_exact(3) {
            let [a, b, c] = [0, 1, 2].map(|i| self.vertices[triangle[i] as usize].position);
            let normal = (b - a).cross(c - a).normalize_or_zero();

            for &index in triangle {
                self.vertices[index as usize].normal = normal;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    #[error("primitive {primitive} of mesh {mesh} has no positions")]
    MissingPositions { mesh: String, primitive: usize },
    #[error("mesh without primitives: {0}")]
    Empty(String),
}

pub struct Model {
    pub name: String,
    pub primitives: Vec<ModelPrimitive>,
}

pub type Buffers<'a> = &'a [buffer::Data];

impl Model {
    pub fn new(name: impl Into<String>, primitives: Vec<ModelPrimitive>) -> Self {
        Self {
            name: name.into(),
            primitives,
        }
    }

    /// Local-space bounds over every primitive.
    pub fn bounding_box(&self) -> Aabb {
        self.primitives
            .iter()
            .fold(Aabb::EMPTY, |aabb, primitive| aabb.union(&primitive.bounding_box))
    }

    /// Reads a glTF mesh. Returns the model along with the glTF material index of each
    /// primitive; resolving those to registered materials is up to the caller.
    pub fn from_gltf(
        name: impl Into<String>,
        mesh: gltf::Mesh,
        buffers: Buffers,
    ) -> Result<(Model, Vec<Option<usize>>), MeshError> {
        let mut model = Model::new(name, Vec::new());
        let mut material_indices = Vec::new();

        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!(
                    "{} (primitive {}): skipping {:?} primitive",
                    model.name,
                    primitive.index(),
                    primitive.mode()
                );
                continue;
            }

            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let positions: Vec<Vec3> = reader
                .read_positions()
                .ok_or_else(|| MeshError::MissingPositions {
                    mesh: model.name.clone(),
                    primitive: primitive.index(),
                })?
                .map(Vec3::from)
                .collect();
            let vertex_count = positions.len();

            let has_normals = reader.read_normals().is_some();
            let normals: Vec<Vec3> = match reader.read_normals() {
                Some(normals) => normals.map(Vec3::from).collect(),
                None => vec![Vec3::ZERO; vertex_count],
            };
            let tex_coords: Vec<Vec2> = match reader.read_tex_coords(0) {
                Some(tex_coords) => tex_coords.into_f32().map(Vec2::from).collect(),
                None => vec![Vec2::ZERO; vertex_count],
            };
            let has_tangents = reader.read_tangents().is_some();
            let tangents: Vec<Vec3> = match reader.read_tangents() {
                Some(tangents) => tangents.map(|t| Vec4::from(t).xyz()).collect(),
                None => vec![Vec3::X; vertex_count],
            };

            let vertices = izip!(positions, normals, tex_coords, tangents)
                .map(|(position, normal, tex_coords, tangent)| Vertex {
                    position,
                    normal,
                    tex_coords,
                    tangent,
                })
                .collect::<Vec<Vertex>>();

            let indices = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect::<Vec<u32>>(),
                None => (0..vertex_count as u32).collect(),
            };

            let mut model_primitive = ModelPrimitive::new(primitive.index(), vertices, indices);

            if !has_normals {
                model_primitive.generate_flat_normals();
            }

            if !has_tangents {
                if let Err(e) = model_primitive.generate_tangents() {
                    log::warn!(
                        "{} (primitive {}): {}, keeping default tangents",
                        model.name,
                        primitive.index(),
                        e
                    );
                }
            }

            model.primitives.push(model_primitive);
            material_indices.push(primitive.material().index());
        }

        if model.primitives.is_empty() {
            return Err(MeshError::Empty(model.name));
        }

        Ok((model, material_indices))
    }
}
