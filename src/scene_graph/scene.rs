use glam::{Mat4, Quat, Vec3};
use id_arena::Arena;

use crate::material_manager::{MaterialId, MaterialManager};
use crate::math::Aabb;
use crate::model::Model;
use crate::scene_graph::object3d::{Object3D, ObjectId};
use crate::scene_graph::prefab::{Prefab, PrefabNode};
use crate::scene_graph::scene_model::{SceneModel, SceneModelId};
use crate::scene_graph::transform::Transform;

pub struct Scene {
    pub objects: Arena<Object3D>,
    pub models: Arena<SceneModel>,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: Arena::new(),
            models: Arena::new(),
        }
    }

    pub fn add_object(&mut self, object: Object3D) -> ObjectId {
        self.objects.alloc(object)
    }

    /// Adds an object and attaches it to `parent`, or to the scene root when `None`.
    pub fn spawn(&mut self, object: Object3D, parent: Option<ObjectId>) -> ObjectId {
        let object_id = self.add_object(object);

        if parent.is_some() {
            self.set_object_parent(object_id, parent);
        }

        object_id
    }

    pub fn get_object(&self, id: ObjectId) -> Option<&Object3D> {
        self.objects.get(id)
    }

    #[cfg(test)]
    pub fn get_object_by_name(&self, name: &str) -> Option<ObjectId> {
        self.objects
            .iter()
            .find(|(_, object)| object.name == name)
            .map(|(id, _)| id)
    }

    pub fn add_model(&mut self, model: SceneModel) -> SceneModelId {
        self.models.alloc(model)
    }

    pub fn get_model(&self, id: SceneModelId) -> Option<&SceneModel> {
        self.models.get(id)
    }

    /// The model drawn by `object_id`, if it is a mesh.
    pub fn object_model(&self, object_id: ObjectId) -> Option<&Model> {
        let model_id = self.get_object(object_id)?.model_id?;
        self.get_model(model_id).map(|scene_model| &scene_model.model)
    }

    /// Spawns a prefab under a new group object named after it and returns that group.
    pub fn spawn_prefab(
        &mut self,
        prefab: Prefab,
        material_manager: &mut MaterialManager,
    ) -> ObjectId {
        let Prefab {
            name,
            nodes,
            roots,
            meshes,
            materials,
        } = prefab;

        let material_ids: Vec<MaterialId> = materials
            .into_iter()
            .enumerate()
            .map(|(index, material)| material_manager.add_gltf_material(&name, index, material))
            .collect();

        let model_ids: Vec<SceneModelId> = meshes
            .into_iter()
            .map(|mesh| {
                let mut model = mesh.model;

                for (primitive, slot) in model.primitives.iter_mut().zip(mesh.primitive_materials) {
                    primitive.material = slot.and_then(|index| material_ids.get(index).copied());
                }

                self.add_model(SceneModel::new(model))
            })
            .collect();

        let group = self.add_object(Object3D::new(name, Transform::default()));

        for root in roots {
            self.spawn_prefab_node(&nodes, root, group, &model_ids);
        }

        group
    }

    fn spawn_prefab_node(
        &mut self,
        nodes: &[PrefabNode],
        node_index: usize,
        parent: ObjectId,
        model_ids: &[SceneModelId],
    ) {
        let Some(node) = nodes.get(node_index) else {
            log::warn!("Prefab node {node_index} out of bounds");
            return;
        };

        let mut object = Object3D::new(
            node.name.clone(),
            Transform::new(node.translation, node.rotation, node.scale),
        );
        object.model_id = node.mesh.and_then(|mesh| model_ids.get(mesh).copied());

        let object_id = self.spawn(object, Some(parent));

        for &child in &node.children {
            self.spawn_prefab_node(nodes, child, object_id, model_ids);
        }
    }

    /// `root` followed by all of its descendants, depth first.
    pub fn descendants(&self, root: ObjectId) -> Vec<ObjectId> {
        let mut result = Vec::new();
        let mut stack = vec![root];

        while let Some(id) = stack.pop() {
            let Some(object) = self.objects.get(id) else {
                continue;
            };

            result.push(id);
            stack.extend(object.child_ids.iter().rev());
        }

        result
    }

    /// World-space bounds of every mesh in the subtree rooted at `root`.
    pub fn world_bounds(&self, root: ObjectId) -> Aabb {
        self.update_transforms();

        self.descendants(root)
            .into_iter()
            .filter_map(|id| {
                let model = self.object_model(id)?;
                let world_matrix = self.world_matrix(id)?;
                Some(model.bounding_box().transformed(&world_matrix))
            })
            .fold(Aabb::EMPTY, |bounds, model_bounds| bounds.union(&model_bounds))
    }

    pub fn world_matrix(&self, object_id: ObjectId) -> Option<Mat4> {
        self.objects
            .get(object_id)
            .map(|object| *object.transform.get_world_matrix())
    }

    /// Updates all object transforms in hierarchical order
    pub fn update_transforms(&self) {
        let root_objects = self
            .objects
            .iter()
            .filter(|(_, object)| object.parent_id.is_none())
            .map(|(id, _)| id);

        for root_id in root_objects {
            self.update_object_transform_recursive(root_id, Mat4::IDENTITY, false);
        }
    }

    fn update_object_transform_recursive(
        &self,
        object_id: ObjectId,
        parent_world_matrix: Mat4,
        parent_changed: bool,
    ) {
        let Some(object) = self.objects.get(object_id) else {
            return;
        };

        let changed = parent_changed || object.transform.is_world_dirty();
        if changed {
            let local_matrix = *object.transform.get_local_matrix();
            object
                .transform
                .set_world_matrix(parent_world_matrix * local_matrix);
        }

        let world_matrix = *object.transform.get_world_matrix();
        for &child_id in &object.child_ids {
            self.update_object_transform_recursive(child_id, world_matrix, changed);
        }
    }

    /// Invalidates world transforms for an object and all its descendants
    pub fn invalidate_object_hierarchy(&self, object_id: ObjectId) {
        if let Some(object) = self.objects.get(object_id) {
            object.transform.invalidate_world();

            for &child_id in &object.child_ids {
                self.invalidate_object_hierarchy(child_id);
            }
        }
    }

    /// Sets the parent of an object and updates child relationships
    pub fn set_object_parent(&mut self, child_id: ObjectId, new_parent_id: Option<ObjectId>) {
        if let Some(old_parent_id) = self.objects.get(child_id).and_then(|child| child.parent_id) {
            if let Some(old_parent) = self.objects.get_mut(old_parent_id) {
                old_parent.child_ids.retain(|&id| id != child_id);
            }
        }

        if let Some(child) = self.objects.get_mut(child_id) {
            child.parent_id = new_parent_id;
        }

        if let Some(new_parent) = new_parent_id.and_then(|id| self.objects.get_mut(id)) {
            new_parent.child_ids.push(child_id);
        }

        self.invalidate_object_hierarchy(child_id);
    }

    pub fn set_object_transform(
        &mut self,
        object_id: ObjectId,
        translation: Vec3,
        rotation: Quat,
        scale: f32,
    ) {
        if let Some(object) = self.objects.get_mut(object_id) {
            object.transform.set_transform(translation, rotation, scale);
        }
        self.invalidate_object_hierarchy(object_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry;
    use crate::scene_graph::prefab::PrefabMesh;

    fn two_level_prefab() -> Prefab {
        let mut body = PrefabNode::new("Body", Vec3::ZERO);
        body.mesh = Some(0);
        body.children = vec![1];

        let mut topping = PrefabNode::new("Topping", Vec3::new(0.0, 1.0, 0.0));
        topping.mesh = Some(0);

        Prefab {
            name: "cake.glb".to_string(),
            nodes: vec![body, topping],
            roots: vec![0],
            meshes: vec![PrefabMesh {
                model: geometry::box_model("Unit", Vec3::ONE),
                primitive_materials: vec![Some(0)],
            }],
            materials: vec![crate::asset_pipeline::materials::MaterialData::new("Sponge")],
        }
    }

    #[test]
    fn test_spawn_prefab_builds_hierarchy() {
        let mut scene = Scene::new();
        let mut materials = MaterialManager::new();

        let group = scene.spawn_prefab(two_level_prefab(), &mut materials);
        let ids = scene.descendants(group);

        assert_eq!(ids.len(), 3);
        assert_eq!(scene.get_object(group).unwrap().name, "cake.glb");
        assert_eq!(scene.get_object(ids[1]).unwrap().name, "Body");
        assert_eq!(scene.get_object(ids[2]).unwrap().name, "Topping");
        assert_eq!(
            scene.get_object(ids[2]).unwrap().parent_id,
            Some(ids[1])
        );

        // Both nodes share the single mesh, which resolved its material.
        assert_eq!(scene.models.len(), 1);
        let model = scene.object_model(ids[2]).unwrap();
        assert!(model.primitives[0].material.is_some());
        assert_eq!(materials.len(), 1);
    }

    #[test]
    fn test_world_bounds_follow_hierarchy() {
        let mut scene = Scene::new();
        let mut materials = MaterialManager::new();
        let group = scene.spawn_prefab(two_level_prefab(), &mut materials);

        let bounds = scene.world_bounds(group);
        assert_eq!(bounds.min, Vec3::new(-0.5, -0.5, -0.5));
        assert_eq!(bounds.max, Vec3::new(0.5, 1.5, 0.5));

        scene.set_object_transform(group, Vec3::new(10.0, 0.0, 0.0), Quat::IDENTITY, 2.0);
        let bounds = scene.world_bounds(group);
        assert_eq!(bounds.min, Vec3::new(9.0, -1.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(11.0, 3.0, 1.0));
    }

    #[test]
    fn test_reparenting_moves_child_lists() {
        let mut scene = Scene::new();
        let a = scene.spawn(Object3D::new("a", Transform::default()), None);
        let b = scene.spawn(Object3D::new("b", Transform::default()), None);
        let child = scene.spawn(Object3D::new("child", Transform::default()), Some(a));

        scene.set_object_parent(child, Some(b));

        assert!(scene.get_object(a).unwrap().child_ids.is_empty());
        assert_eq!(scene.get_object(b).unwrap().child_ids, vec![child]);
        assert_eq!(scene.get_object_by_name("child"), Some(child));
    }
}
