//! Ray picking against registered scene meshes.
//!
//! Rays are moved into each mesh's local space, rejected early against the primitive bounds,
//! then tested triangle by triangle. Reported distances are along the world-space ray.

use glam::{Vec2, Vec3};

use crate::math::Ray;
use crate::scene_graph::{ObjectId, Scene};

/// Meshes that can be hit by the pointer, in registration order.
#[derive(Debug, Default)]
pub struct HitRegistry {
    objects: Vec<ObjectId>,
}

impl HitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registering an object twice has no effect.
    pub fn register(&mut self, object_id: ObjectId) {
        if !self.objects.contains(&object_id) {
            self.objects.push(object_id);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.objects.iter().copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub object_id: ObjectId,
    pub distance: f32,
    pub point: Vec3,
}

/// Pointer position in physical pixels to normalized device coordinates, +Y up.
pub fn pointer_ndc(position: Vec2, viewport: Vec2) -> Vec2 {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return Vec2::ZERO;
    }

    Vec2::new(
        position.x / viewport.x * 2.0 - 1.0,
        -(position.y / viewport.y) * 2.0 + 1.0,
    )
}

/// Every registered mesh the ray strikes, nearest first. Expects up to date world matrices.
pub fn intersect_registry(scene: &Scene, registry: &HitRegistry, ray: &Ray) -> Vec<Intersection> {
    let mut hits: Vec<Intersection> = registry
        .iter()
        .filter_map(|object_id| intersect_object(scene, object_id, ray))
        .collect();

    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

/// Nearest intersection between `ray` and the mesh of `object_id`, if any.
pub fn intersect_object(scene: &Scene, object_id: ObjectId, ray: &Ray) -> Option<Intersection> {
    let model = scene.object_model(object_id)?;
    let world_matrix = scene.world_matrix(object_id)?;

    // Degenerate scale leaves nothing to hit.
    if world_matrix.determinant().abs() < f32::EPSILON {
        return None;
    }

    let local_ray = ray.transformed(&world_matrix.inverse());

    model
        .primitives
        .iter()
        .filter(|primitive| primitive.bounding_box.intersect_ray(&local_ray).is_some())
        .flat_map(|primitive| primitive.triangles())
        .filter_map(|[a, b, c]| local_ray.intersect_triangle(a, b, c))
        .map(|t| {
            let point = world_matrix.transform_point3(local_ray.at(t));
            Intersection {
                object_id,
                distance: (point - ray.origin).length(),
                point,
            }
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

#[cfg(test)]
mod tests {
    use glam::{Quat, Vec3};

    use super::*;
    use crate::geometry;
    use crate::scene_graph::{Object3D, SceneModel, Transform};

    fn scene_with_boxes() -> (Scene, HitRegistry, ObjectId, ObjectId) {
        let mut scene = Scene::new();
        let model = scene.add_model(SceneModel::new(geometry::box_model("Box", Vec3::ONE)));

        let near = scene.spawn(
            Object3D::new("Near", Transform::from_translation(Vec3::new(0.0, 0.0, -5.0)))
                .with_model(model),
            None,
        );
        let far = scene.spawn(
            Object3D::new(
                "Far",
                Transform::new(Vec3::new(0.0, 0.0, -20.0), Quat::IDENTITY, 4.0),
            )
            .with_model(model),
            None,
        );
        scene.update_transforms();

        let mut registry = HitRegistry::new();
        registry.register(far);
        registry.register(near);

        (scene, registry, near, far)
    }

    #[test]
    fn test_hits_are_sorted_nearest_first() {
        let (scene, registry, near, far) = scene_with_boxes();
        let ray = Ray::new(Vec3::new(0.1, 0.2, 0.0), Vec3::NEG_Z);

        let hits = intersect_registry(&scene, &registry, &ray);

        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].object_id, near);
        assert_eq!(hits[1].object_id, far);
        assert!((hits[0].distance - 4.5).abs() < 1e-4);
        // The far box is scaled by 4, so its front face sits at z = -18.
        assert!((hits[1].distance - 18.0).abs() < 1e-3);
        assert!(hits[1].point.abs_diff_eq(Vec3::new(0.1, 0.2, -18.0), 1e-3));
    }

    #[test]
    fn test_miss_returns_nothing() {
        let (scene, registry, _, _) = scene_with_boxes();
        let ray = Ray::new(Vec3::ZERO, Vec3::X);

        assert!(intersect_registry(&scene, &registry, &ray).is_empty());
    }

    #[test]
    fn test_unregistered_meshes_are_ignored() {
        let (scene, _, _, _) = scene_with_boxes();
        let ray = Ray::new(Vec3::new(0.1, 0.2, 0.0), Vec3::NEG_Z);

        assert!(intersect_registry(&scene, &HitRegistry::new(), &ray).is_empty());
    }

    #[test]
    fn test_register_is_idempotent() {
        let (_, mut registry, near, _) = scene_with_boxes();
        registry.register(near);
        assert_eq!(registry.iter().count(), 2);
        assert_eq!(registry.iter().filter(|&id| id == near).count(), 1);
    }

    #[test]
    fn test_pointer_ndc_corners() {
        let viewport = Vec2::new(800.0, 600.0);

        assert_eq!(pointer_ndc(Vec2::ZERO, viewport), Vec2::new(-1.0, 1.0));
        assert_eq!(pointer_ndc(viewport, viewport), Vec2::new(1.0, -1.0));
        assert_eq!(pointer_ndc(viewport * 0.5, viewport), Vec2::ZERO);
    }
}
