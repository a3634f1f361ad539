use std::collections::HashMap;

use crate::category::ProductCategory;
use crate::scene_graph::{ObjectId, Scene};

/// Category labels for scene objects, kept beside the graph rather than on the nodes.
#[derive(Default)]
pub struct CategoryTags {
    tags: HashMap<ObjectId, ProductCategory>,
}

impl CategoryTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(&mut self, object_id: ObjectId, category: ProductCategory) {
        self.tags.insert(object_id, category);
    }

    pub fn get(&self, object_id: ObjectId) -> Option<ProductCategory> {
        self.tags.get(&object_id).copied()
    }

    /// Tags `root` and every mesh below it. Returns the tagged meshes.
    pub fn tag_subtree(
        &mut self,
        scene: &Scene,
        root: ObjectId,
        category: ProductCategory,
    ) -> Vec<ObjectId> {
        self.tag(root, category);

        let meshes: Vec<ObjectId> = scene
            .descendants(root)
            .into_iter()
            .filter(|&id| scene.get_object(id).is_some_and(|object| object.is_mesh()))
            .collect();

        for &mesh in &meshes {
            self.tag(mesh, category);
        }

        meshes
    }

    /// The object's own tag, falling back to its parent's.
    pub fn resolve(&self, scene: &Scene, object_id: ObjectId) -> Option<ProductCategory> {
        self.get(object_id).or_else(|| {
            let parent_id = scene.get_object(object_id)?.parent_id?;
            self.get(parent_id)
        })
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;
    use crate::geometry;
    use crate::scene_graph::{Object3D, SceneModel, Transform};

    #[test]
    fn test_tag_subtree_reaches_nested_meshes_only() {
        let mut scene = Scene::new();
        let model = scene.add_model(SceneModel::new(geometry::box_model("Box", Vec3::ONE)));

        let root = scene.spawn(Object3D::new("cupcake.glb", Transform::default()), None);
        let group = scene.spawn(Object3D::new("Group", Transform::default()), Some(root));
        let liner = scene.spawn(
            Object3D::new("Liner", Transform::default()).with_model(model),
            Some(group),
        );
        let frosting = scene.spawn(
            Object3D::new("Frosting", Transform::default()).with_model(model),
            Some(root),
        );
        let unrelated = scene.spawn(
            Object3D::new("Counter", Transform::default()).with_model(model),
            None,
        );

        let mut tags = CategoryTags::new();
        let meshes = tags.tag_subtree(&scene, root, ProductCategory::Cupcake);

        assert_eq!(meshes.len(), 2);
        assert!(meshes.contains(&liner));
        assert!(meshes.contains(&frosting));
        assert_eq!(tags.get(root), Some(ProductCategory::Cupcake));
        assert_eq!(tags.get(liner), Some(ProductCategory::Cupcake));
        assert_eq!(tags.get(group), None);
        assert_eq!(tags.get(unrelated), None);
    }

    #[test]
    fn test_resolve_falls_back_to_parent() {
        let mut scene = Scene::new();
        let root = scene.spawn(Object3D::new("cake.glb", Transform::default()), None);
        let child = scene.spawn(Object3D::new("Candy", Transform::default()), Some(root));
        let orphan = scene.spawn(Object3D::new("Floor", Transform::default()), None);

        let mut tags = CategoryTags::new();
        tags.tag(root, ProductCategory::Cake);

        assert_eq!(tags.resolve(&scene, child), Some(ProductCategory::Cake));
        assert_eq!(tags.resolve(&scene, orphan), None);
    }
}
