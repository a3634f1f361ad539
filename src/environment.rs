//! The static room the product models are shown in: lights, floor, walls, ceiling, counter
//! and the logo.

use std::f32::consts::PI;
use std::path::PathBuf;

use glam::{Quat, Vec2, Vec3};
use rayon::prelude::*;

use crate::asset_pipeline::{materials::MaterialData, texture_image::TextureImage};
use crate::config::ShowroomConfig;
use crate::geometry;
use crate::lighting::{AmbientLight, Lighting, SpotLight};
use crate::material_manager::{MaterialId, MaterialManager};
use crate::math::Color;
use crate::model::Model;
use crate::scene_graph::{Object3D, ObjectId, Scene, SceneModel, SceneModelId, Transform};

pub const CLEAR_COLOR: Color = Color(0xFFF5F5);
const CEILING_COLOR: Color = Color(0xF0E4E4);
const COUNTER_COLOR: Color = Color(0xB57EDC);

const ROOM_SIZE: f32 = 40.0;
const WALL_HEIGHT: f32 = 10.0;
const WALL_THICKNESS: f32 = 0.5;
const TEXTURE_REPEAT: Vec2 = Vec2::splat(6.0);

/// Decoded room textures. A texture that failed to load is `None` and its material is
/// drawn without it.
#[derive(Debug, Default)]
pub struct EnvironmentTextures {
    pub floor: Option<TextureImage>,
    pub wall_color: Option<TextureImage>,
    pub wall_normal: Option<TextureImage>,
    pub wall_roughness: Option<TextureImage>,
    pub wall_ambient_occlusion: Option<TextureImage>,
    pub logo: Option<TextureImage>,
}

impl EnvironmentTextures {
    /// Decodes every texture in parallel.
    pub fn load(config: &ShowroomConfig) -> Self {
        let environment = &config.environment;
        let paths: Vec<PathBuf> = [
            &environment.floor_texture,
            &environment.wall_color_texture,
            &environment.wall_normal_texture,
            &environment.wall_roughness_texture,
            &environment.wall_ambient_occlusion_texture,
            &environment.logo_texture,
        ]
        .into_iter()
        .map(|path| config.asset_path(path))
        .collect();

        let mut images = paths
            .par_iter()
            .map(|path| match TextureImage::from_path(path) {
                Ok(image) => Some(image),
                Err(e) => {
                    log::warn!("Texture not loaded, drawing blank: {e}");
                    None
                }
            })
            .collect::<Vec<_>>()
            .into_iter();

        Self {
            floor: images.next().flatten(),
            wall_color: images.next().flatten(),
            wall_normal: images.next().flatten(),
            wall_roughness: images.next().flatten(),
            wall_ambient_occlusion: images.next().flatten(),
            logo: images.next().flatten(),
        }
    }
}

/// What the room contributes besides scene objects.
#[derive(Debug, Clone, Copy)]
pub struct Environment {
    pub lighting: Lighting,
    pub clear_color: Color,
}

pub fn default_lighting() -> Lighting {
    Lighting {
        ambient: AmbientLight {
            color: Color::WHITE,
            intensity: 0.6,
        },
        spot: SpotLight {
            color: Color::WHITE,
            intensity: 5.0,
            position: Vec3::new(20.0, 10.0, -5.0),
            target: Vec3::new(0.0, 1.0, -5.0),
            angle: PI / 6.0,
            penumbra: 0.3,
            decay: 1.5,
            distance: 50.0,
        },
    }
}

/// Adds the room to `scene`. Runs once at startup.
pub fn build_environment(
    scene: &mut Scene,
    materials: &mut MaterialManager,
    textures: EnvironmentTextures,
) -> Environment {
    let EnvironmentTextures {
        floor,
        wall_color,
        wall_normal,
        wall_roughness,
        wall_ambient_occlusion,
        logo,
    } = textures;

    let mut floor_material = MaterialData::new("Floor").with_uv_repeat(TEXTURE_REPEAT);
    floor_material.base_color = floor;
    let floor_material = materials.add_material(floor_material);

    let mut wall_material = MaterialData::new("Wall").with_uv_repeat(TEXTURE_REPEAT);
    wall_material.base_color = wall_color;
    wall_material.normal = wall_normal;
    wall_material.roughness = wall_roughness;
    wall_material.ambient_occlusion = wall_ambient_occlusion;
    let wall_material = materials.add_material(wall_material);

    let ceiling_material =
        materials.add_material(MaterialData::new("Ceiling").with_color(CEILING_COLOR));
    let counter_material =
        materials.add_material(MaterialData::new("Counter").with_color(COUNTER_COLOR));

    let mut logo_material = MaterialData::new("Logo");
    logo_material.base_color = logo;
    let logo_material = materials.add_material(logo_material);

    let floor_model = add_model(
        scene,
        geometry::plane_model("Floor", ROOM_SIZE, ROOM_SIZE),
        floor_material,
    );
    spawn_mesh(
        scene,
        "Floor",
        floor_model,
        Transform::from_translation_rotation(Vec3::ZERO, Quat::from_rotation_x(-PI / 2.0)),
    );

    let wall_model = add_model(
        scene,
        geometry::box_model("Wall", Vec3::new(ROOM_SIZE, WALL_HEIGHT, WALL_THICKNESS)),
        wall_material,
    );
    let half_room = ROOM_SIZE / 2.0;
    let wall_y = WALL_HEIGHT / 2.0;
    spawn_mesh(
        scene,
        "Back wall",
        wall_model,
        Transform::from_translation(Vec3::new(0.0, wall_y, -half_room)),
    );
    for (name, x) in [("Left wall", -half_room), ("Right wall", half_room)] {
        spawn_mesh(
            scene,
            name,
            wall_model,
            Transform::from_translation_rotation(
                Vec3::new(x, wall_y, 0.0),
                Quat::from_rotation_y(PI / 2.0),
            ),
        );
    }

    let ceiling_model = add_model(
        scene,
        geometry::plane_model("Ceiling", ROOM_SIZE, ROOM_SIZE),
        ceiling_material,
    );
    spawn_mesh(
        scene,
        "Ceiling",
        ceiling_model,
        Transform::from_translation_rotation(
            Vec3::new(0.0, WALL_HEIGHT, 0.0),
            Quat::from_rotation_x(PI / 2.0),
        ),
    );

    let counter_model = add_model(
        scene,
        geometry::box_model("Counter", Vec3::new(30.0, 2.0, 10.0)),
        counter_material,
    );
    spawn_mesh(
        scene,
        "Counter",
        counter_model,
        Transform::from_translation(Vec3::new(0.0, 1.0, -5.0)),
    );

    let logo_model = add_model(scene, geometry::plane_model("Logo", 8.0, 3.0), logo_material);
    spawn_mesh(
        scene,
        "Logo",
        logo_model,
        Transform::from_translation(Vec3::new(0.0, 7.5, -19.7)),
    );

    log::info!("Showroom environment ready");

    Environment {
        lighting: default_lighting(),
        clear_color: CLEAR_COLOR,
    }
}

fn add_model(scene: &mut Scene, mut model: Model, material: MaterialId) -> SceneModelId {
    for primitive in &mut model.primitives {
        primitive.material = Some(material);
    }

    scene.add_model(SceneModel::new(model))
}

fn spawn_mesh(
    scene: &mut Scene,
    name: &str,
    model_id: SceneModelId,
    transform: Transform,
) -> ObjectId {
    scene.spawn(Object3D::new(name, transform).with_model(model_id), None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build() -> (Scene, MaterialManager, Environment) {
        let mut scene = Scene::new();
        let mut materials = MaterialManager::new();
        let environment =
            build_environment(&mut scene, &mut materials, EnvironmentTextures::default());
        scene.update_transforms();
        (scene, materials, environment)
    }

    #[test]
    fn test_room_layout() {
        let (scene, materials, environment) = build();

        assert_eq!(scene.objects.len(), 7);
        // Both side walls share one model.
        assert_eq!(scene.models.len(), 5);
        assert_eq!(materials.len(), 5);
        assert_eq!(environment.clear_color, Color(0xFFF5F5));

        let floor = scene.get_object_by_name("Floor").unwrap();
        let bounds = scene.world_bounds(floor);
        assert!(bounds.min.abs_diff_eq(Vec3::new(-20.0, 0.0, -20.0), 1e-4));
        assert!(bounds.max.abs_diff_eq(Vec3::new(20.0, 0.0, 20.0), 1e-4));

        let right_wall = scene.get_object_by_name("Right wall").unwrap();
        let bounds = scene.world_bounds(right_wall);
        assert!(bounds.size().abs_diff_eq(Vec3::new(0.5, 10.0, 40.0), 1e-4));
        assert!(bounds.center().abs_diff_eq(Vec3::new(20.0, 5.0, 0.0), 1e-4));
    }

    #[test]
    fn test_floor_and_ceiling_face_into_the_room() {
        let (scene, _, _) = build();

        let floor = scene.get_object_by_name("Floor").unwrap();
        let ceiling = scene.get_object_by_name("Ceiling").unwrap();

        let floor_normal = scene.world_matrix(floor).unwrap().transform_vector3(Vec3::Z);
        let ceiling_normal = scene.world_matrix(ceiling).unwrap().transform_vector3(Vec3::Z);

        assert!(floor_normal.abs_diff_eq(Vec3::Y, 1e-5));
        assert!(ceiling_normal.abs_diff_eq(Vec3::NEG_Y, 1e-5));
    }

    #[test]
    fn test_missing_textures_leave_materials_blank() {
        let mut config = ShowroomConfig::default();
        config.asset_root = std::env::temp_dir().join("bakery-showroom-no-such-assets");

        let textures = EnvironmentTextures::load(&config);
        assert!(textures.floor.is_none());
        assert!(textures.logo.is_none());
    }
}
