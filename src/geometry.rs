//! Procedural room geometry. Planes face +Z before any rotation is applied, boxes are
//! centered on the origin, and every face maps the full texture once (materials tile it).

use glam::{Vec2, Vec3};

use crate::model::{Model, ModelPrimitive, Vertex};

struct Face {
    center: Vec3,
    /// Half extent along the texture's u axis.
    u: Vec3,
    /// Half extent along the texture's v axis (up in the image).
    v: Vec3,
}

impl Face {
    fn normal(&self) -> Vec3 {
        self.u.cross(self.v).normalize()
    }

    fn append(&self, vertices: &mut Vec<Vertex>, indices: &mut Vec<u32>) {
        let normal = self.normal();
        let tangent = self.u.normalize();
        let first = vertices.len() as u32;

        let corners = [
            (self.center - self.u - self.v, Vec2::new(0.0, 1.0)),
            (self.center + self.u - self.v, Vec2::new(1.0, 1.0)),
            (self.center + self.u + self.v, Vec2::new(1.0, 0.0)),
            (self.center - self.u + self.v, Vec2::new(0.0, 0.0)),
        ];

        vertices.extend(corners.map(|(position, tex_coords)| Vertex {
            position,
            normal,
            tex_coords,
            tangent,
        }));

        indices.extend([0, 1, 2, 0, 2, 3].map(|i| first + i));
    }
}

pub fn plane_model(name: impl Into<String>, width: f32, height: f32) -> Model {
    let face = Face {
        center: Vec3::ZERO,
        u: Vec3::X * width * 0.5,
        v: Vec3::Y * height * 0.5,
    };

    let mut vertices = Vec::with_capacity(4);
    let mut indices = Vec::with_capacity(6);
    face.append(&mut vertices, &mut indices);

    Model::new(name, vec![ModelPrimitive::new(0, vertices, indices)])
}

pub fn box_model(name: impl Into<String>, size: Vec3) -> Model {
    let half = size * 0.5;

    let faces = [
        // +X
        Face {
            center: Vec3::X * half.x,
            u: Vec3::NEG_Z * half.z,
            v: Vec3::Y * half.y,
        },
        // -X
        Face {
            center: Vec3::NEG_X * half.x,
            u: Vec3::Z * half.z,
            v: Vec3::Y * half.y,
        },
        // +Y
        Face {
            center: Vec3::Y * half.y,
            u: Vec3::X * half.x,
            v: Vec3::NEG_Z * half.z,
        },
        // -Y
        Face {
            center: Vec3::NEG_Y * half.y,
            u: Vec3::X * half.x,
            v: Vec3::Z * half.z,
        },
        // +Z
        Face {
            center: Vec3::Z * half.z,
            u: Vec3::X * half.x,
            v: Vec3::Y * half.y,
        },
        // -Z
        Face {
            center: Vec3::NEG_Z * half.z,
            u: Vec3::NEG_X * half.x,
            v: Vec3::Y * half.y,
        },
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for face in &faces {
        face.append(&mut vertices, &mut indices);
    }

    Model::new(name, vec![ModelPrimitive::new(0, vertices, indices)])
}
