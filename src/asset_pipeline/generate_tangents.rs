// Not every exporter writes tangents (the product models mostly don't), but the shader
// needs them for normal mapping, so missing ones are generated here.

use bevy_mikktspace::{generate_tangents, Geometry};

use crate::model::ModelPrimitive;

impl Geometry for ModelPrimitive {
    fn num_faces(&self) -> usize {
        self.indices.len() / 3
    }

    fn num_vertices_of_face(&self, _face: usize) -> usize {
        3
    }

    fn position(&self, face: usize, vert: usize) -> [f32; 3] {
        self.vertex_by_triangle_index(face, vert).position.to_array()
    }

    fn normal(&self, face: usize, vert: usize) -> [f32; 3] {
        self.vertex_by_triangle_index(face, vert).normal.to_array()
    }

    fn tex_coord(&self, face: usize, vert: usize) -> [f32; 2] {
        self.vertex_by_triangle_index(face, vert).tex_coords.to_array()
    }

    fn set_tangent(
        &mut self,
        tangent: [f32; 3],
        _bi_tangent: [f32; 3],
        _f_mag_s: f32,
        _f_mag_t: f32,
        _bi_tangent_preserves_orientation: bool,
        face: usize,
        vert: usize,
    ) {
        let vertex = self.vertex_by_triangle_index_mut(face, vert);
        vertex.tangent = glam::Vec3::from_array(tangent);
    }
}

#[derive(Debug, thiserror::Error)]
#[error("mikktspace could not generate tangents")]
pub struct TangentError;

impl ModelPrimitive {
    pub fn generate_tangents(&mut self) -> Result<(), TangentError> {
        if generate_tangents(self) {
            Ok(())
        } else {
            Err(TangentError)
        }
    }
}
