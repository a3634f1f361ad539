pub mod object3d;
pub mod prefab;
pub mod scene;
pub mod scene_model;
pub mod tags;
pub mod transform;

pub use object3d::{Object3D, ObjectId};
pub use prefab::Prefab;
pub use scene::Scene;
pub use scene_model::{SceneModel, SceneModelId};
pub use tags::CategoryTags;
pub use transform::Transform;
