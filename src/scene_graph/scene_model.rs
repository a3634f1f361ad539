use id_arena::Id;

use crate::model::Model;

pub type SceneModelId = Id<SceneModel>;

/// Geometry shared by every object that references it.
pub struct SceneModel {
    pub model: Model,
}

impl SceneModel {
    pub fn new(model: Model) -> Self {
        Self { model }
    }
}
