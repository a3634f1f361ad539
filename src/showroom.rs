use glam::{Quat, Vec2, Vec3};
use winit::event::MouseButton;
use winit::keyboard::KeyCode;

use crate::asset_loader::{AssetLoader, LoadedModel};
use crate::camera::Camera;
use crate::category::ProductCategory;
use crate::config::{ModelConfig, ShowroomConfig};
use crate::controls::orbit::DragMode;
use crate::controls::{MovementState, OrbitControls};
use crate::environment::{build_environment, Environment, EnvironmentTextures};
use crate::input::PointerState;
use crate::material_manager::MaterialManager;
use crate::navigation::Navigator;
use crate::picking::{self, HitRegistry, Intersection};
use crate::scene_graph::{CategoryTags, ObjectId, Prefab, Scene};

/// Height above a model's bounds at which its caption floats.
const LABEL_OFFSET: f32 = 0.5;

/// A caption anchored at a fixed world position.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub text: String,
    pub position: Vec3,
}

/// Everything the 3D showroom needs between frames: the scene and its side tables, the
/// camera with both control schemes, and pointer state.
pub struct Showroom {
    config: ShowroomConfig,
    pub scene: Scene,
    pub materials: MaterialManager,
    pub camera: Camera,
    pub environment: Environment,
    orbit: OrbitControls,
    movement: MovementState,
    tags: CategoryTags,
    hits: HitRegistry,
    labels: Vec<Label>,
    pointer: PointerState,
    viewport: Vec2,
    hovering: bool,
    loader: AssetLoader,
}

impl Showroom {
    pub fn new(
        config: ShowroomConfig,
        runtime: tokio::runtime::Handle,
        textures: EnvironmentTextures,
        viewport: Vec2,
    ) -> Self {
        let mut scene = Scene::new();
        let mut materials = MaterialManager::new();
        let environment = build_environment(&mut scene, &mut materials, textures);

        let mut camera = Camera::from_config(&config.camera, 1.0);
        camera.set_viewport(viewport);

        Self {
            orbit: OrbitControls::new(&config.controls),
            movement: MovementState::new(),
            config,
            scene,
            materials,
            camera,
            environment,
            tags: CategoryTags::new(),
            hits: HitRegistry::new(),
            labels: Vec::new(),
            pointer: PointerState::new(),
            viewport,
            hovering: false,
            loader: AssetLoader::new(runtime),
        }
    }

    /// Starts loading every configured product model.
    pub fn load_models(&mut self) {
        for request in self.config.models.clone() {
            self.loader.load(request, &self.config.asset_root);
        }
    }

    /// Runs the continuation of every load that finished since the last frame.
    pub fn process_loads(&mut self) {
        for LoadedModel { request, outcome } in self.loader.drain() {
            match outcome {
                Ok(prefab) => {
                    self.attach_model(&request, prefab);
                    log::info!("Loaded {} ({})", request.path.display(), request.category);
                }
                Err(e) => log::error!("Could not load {} model: {e}", request.category),
            }
        }
    }

    /// Places a loaded model in the room and makes it clickable.
    pub fn attach_model(&mut self, request: &ModelConfig, prefab: Prefab) -> ObjectId {
        let root = self.scene.spawn_prefab(prefab, &mut self.materials);
        self.normalize(root, request.placement, request.scale);

        for mesh in self.tags.tag_subtree(&self.scene, root, request.category) {
            self.hits.register(mesh);
        }

        if let Some(text) = &request.label {
            let bounds = self.scene.world_bounds(root);
            if !bounds.is_empty() {
                self.labels.push(Label {
                    text: text.clone(),
                    position: Vec3::new(
                        bounds.center().x,
                        bounds.max.y + LABEL_OFFSET,
                        bounds.center().z,
                    ),
                });
            }
        }

        root
    }

    /// Moves the model's bounds center to the origin, lifts it by half its height and offsets
    /// it by `placement`, then applies `scale`. Bounds are measured before scaling.
    fn normalize(&mut self, root: ObjectId, placement: Vec3, scale: f32) {
        let bounds = self.scene.world_bounds(root);
        if bounds.is_empty() {
            log::warn!("Model has no geometry to place");
            return;
        }

        let translation = -bounds.center() + Vec3::new(0.0, bounds.size().y / 2.0, 0.0) + placement;
        self.scene
            .set_object_transform(root, translation, Quat::IDENTITY, scale);
        self.scene.update_transforms();
    }

    pub fn resize(&mut self, viewport: Vec2) {
        self.viewport = viewport;
        self.camera.set_viewport(viewport);
    }

    pub fn viewport(&self) -> Vec2 {
        self.viewport
    }

    pub fn pointer_moved(&mut self, position: Vec2) {
        if let Some(delta) = self.pointer.moved(position) {
            self.orbit.drag(delta, self.viewport, &self.camera);
        }
    }

    pub fn pointer_left(&mut self) {
        self.pointer.left();
        self.orbit.end_drag();
    }

    /// Left drags rotate, right and middle drags pan. A left press and release in place is
    /// a click; returns the category it navigated to.
    pub fn mouse_button(
        &mut self,
        button: MouseButton,
        pressed: bool,
        navigator: &mut dyn Navigator,
    ) -> Option<ProductCategory> {
        match (button, pressed) {
            (MouseButton::Left, true) => {
                self.pointer.press();
                self.orbit.begin_drag(DragMode::Rotate);
                None
            }
            (MouseButton::Right | MouseButton::Middle, true) => {
                self.orbit.begin_drag(DragMode::Pan);
                None
            }
            (MouseButton::Left, false) => {
                self.orbit.end_drag();
                if self.pointer.release() {
                    self.click(navigator)
                } else {
                    None
                }
            }
            (_, false) => {
                self.orbit.end_drag();
                None
            }
            _ => None,
        }
    }

    /// Positive steps zoom in.
    pub fn scroll(&mut self, steps: f32) {
        self.orbit.zoom(steps);
    }

    pub fn key(&mut self, key: KeyCode, pressed: bool) -> bool {
        self.movement.handle_key(key, pressed)
    }

    pub fn focus_lost(&mut self) {
        self.movement.release_all();
        self.orbit.end_drag();
    }

    /// Nearest registered mesh under the pointer.
    pub fn hit_test(&self) -> Option<Intersection> {
        let position = self.pointer.position()?;
        let ndc = picking::pointer_ndc(position, self.viewport);
        let ray = self.camera.ray_from_ndc(ndc);

        picking::intersect_registry(&self.scene, &self.hits, &ray)
            .into_iter()
            .next()
    }

    /// Navigates to the product section of the model under the pointer, if any.
    pub fn click(&mut self, navigator: &mut dyn Navigator) -> Option<ProductCategory> {
        let hit = self.hit_test()?;
        let category = self.tags.resolve(&self.scene, hit.object_id)?;

        log::info!("Clicked on {category}");
        navigator.navigate(&self.config.navigation_url(category));

        Some(category)
    }

    /// Advances one frame: finished loads, camera controls, transforms and hover state.
    pub fn update(&mut self, ui_wants_mouse: bool) {
        self.process_loads();

        self.orbit.update(&mut self.camera);
        self.movement.apply(&mut self.camera, self.config.movement.step);

        self.scene.update_transforms();
        self.hovering = !ui_wants_mouse && self.hit_test().is_some();
    }

    /// Whether the pointer rests on a clickable model.
    pub fn is_hovering(&self) -> bool {
        self.hovering
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry;
    use crate::navigation::RecordingNavigator;
    use crate::scene_graph::prefab::{PrefabMesh, PrefabNode};

    const VIEWPORT: Vec2 = Vec2::new(800.0, 600.0);

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .build()
            .unwrap()
    }

    fn showroom(runtime: &tokio::runtime::Runtime) -> Showroom {
        Showroom::new(
            ShowroomConfig::default(),
            runtime.handle().clone(),
            EnvironmentTextures::default(),
            VIEWPORT,
        )
    }

    /// A cube of side `size` under a group node, offset from the origin.
    fn cube_prefab(size: f32, offset: Vec3) -> Prefab {
        let mut group = PrefabNode::new("Group", offset);
        group.children = vec![1];

        let mut mesh = PrefabNode::new("Cube", Vec3::ZERO);
        mesh.mesh = Some(0);

        Prefab {
            name: "cube.glb".to_string(),
            nodes: vec![group, mesh],
            roots: vec![0],
            meshes: vec![PrefabMesh {
                model: geometry::box_model("Cube", Vec3::splat(size)),
                primitive_materials: vec![None],
            }],
            materials: Vec::new(),
        }
    }

    fn request(category: ProductCategory, placement: Vec3, scale: f32) -> ModelConfig {
        ModelConfig {
            category,
            path: "cube.glb".into(),
            placement,
            scale,
            label: Some("Cubes".to_string()),
        }
    }

    /// Puts a cube of side 2 centered on the orbit target and the pointer over it.
    fn showroom_with_cube(runtime: &tokio::runtime::Runtime, category: ProductCategory) -> Showroom {
        let mut showroom = showroom(runtime);
        showroom.attach_model(
            &request(category, Vec3::new(0.0, -1.0, 0.0), 1.0),
            cube_prefab(2.0, Vec3::new(3.0, 3.0, 3.0)),
        );
        showroom.pointer_moved(VIEWPORT * 0.5);
        showroom
    }

    #[test]
    fn test_normalize_rests_model_on_placement() {
        let runtime = runtime();
        let mut showroom = showroom(&runtime);

        let root = showroom.attach_model(
            &request(ProductCategory::Cupcake, Vec3::new(0.0, 1.5, -5.0), 1.0),
            cube_prefab(2.0, Vec3::new(4.0, -7.0, 1.0)),
        );

        let bounds = showroom.scene.world_bounds(root);
        assert!(bounds.min.abs_diff_eq(Vec3::new(-1.0, 1.5, -6.0), 1e-4));
        assert!(bounds.max.abs_diff_eq(Vec3::new(1.0, 3.5, -4.0), 1e-4));
    }

    #[test]
    fn test_normalize_scales_after_measuring() {
        let runtime = runtime();
        let mut showroom = showroom(&runtime);

        let root = showroom.attach_model(
            &request(ProductCategory::Cookie, Vec3::new(8.0, 1.5, -5.0), 2.0),
            cube_prefab(1.0, Vec3::ZERO),
        );

        // Translation is (8, 2, -5); the unit cube around the origin doubles around it.
        let bounds = showroom.scene.world_bounds(root);
        assert!(bounds.center().abs_diff_eq(Vec3::new(8.0, 2.0, -5.0), 1e-4));
        assert!(bounds.size().abs_diff_eq(Vec3::splat(2.0), 1e-4));
    }

    #[test]
    fn test_attach_tags_and_registers_meshes_only() {
        let runtime = runtime();
        let mut showroom = showroom(&runtime);

        let root = showroom.attach_model(
            &request(ProductCategory::Cake, Vec3::ZERO, 1.0),
            cube_prefab(1.0, Vec3::ZERO),
        );

        assert_eq!(showroom.hits.iter().count(), 1);
        assert_eq!(showroom.tags.get(root), Some(ProductCategory::Cake));
        for id in showroom.hits.iter() {
            assert!(showroom.scene.get_object(id).unwrap().is_mesh());
            assert_eq!(showroom.tags.get(id), Some(ProductCategory::Cake));
        }

        let label = &showroom.labels()[0];
        assert_eq!(label.text, "Cubes");
        assert!((label.position.y - 1.5).abs() < 1e-4);
    }

    #[test]
    fn test_click_navigates_to_category_url() {
        let runtime = runtime();
        let expected = [
            (
                ProductCategory::Cake,
                "http://localhost:8080/products#:~:text=Our%20Bakery%20Products-,Cakes,-%2465%20%2D%2085",
            ),
            (
                ProductCategory::Cupcake,
                "http://localhost:8080/products#:~:text=in/8%20in-,Cupcakes,-%2448",
            ),
            (
                ProductCategory::Cookie,
                "http://localhost:8080/products#:~:text=Size%3A%2018%20Cupcakes-,Cookies,-Location",
            ),
        ];

        for (category, url) in expected {
            let mut showroom = showroom_with_cube(&runtime, category);
            let mut navigator = RecordingNavigator::default();

            assert_eq!(showroom.click(&mut navigator), Some(category));
            assert_eq!(navigator.visited, vec![url.to_string()]);
        }
    }

    #[test]
    fn test_click_on_empty_space_never_navigates() {
        let runtime = runtime();
        let mut showroom = showroom_with_cube(&runtime, ProductCategory::Cake);
        showroom.pointer_moved(Vec2::new(5.0, 5.0));

        let mut navigator = RecordingNavigator::default();
        assert_eq!(showroom.click(&mut navigator), None);
        assert!(navigator.visited.is_empty());
    }

    #[test]
    fn test_click_without_models_never_navigates() {
        let runtime = runtime();
        let mut showroom = showroom(&runtime);
        showroom.pointer_moved(VIEWPORT * 0.5);

        let mut navigator = RecordingNavigator::default();
        assert_eq!(showroom.click(&mut navigator), None);
        assert!(navigator.visited.is_empty());
    }

    #[test]
    fn test_press_and_release_in_place_clicks() {
        let runtime = runtime();
        let mut showroom = showroom_with_cube(&runtime, ProductCategory::Cupcake);
        let mut navigator = RecordingNavigator::default();

        showroom.mouse_button(MouseButton::Left, true, &mut navigator);
        let clicked = showroom.mouse_button(MouseButton::Left, false, &mut navigator);

        assert_eq!(clicked, Some(ProductCategory::Cupcake));
        assert_eq!(navigator.visited.len(), 1);
    }

    #[test]
    fn test_drag_release_does_not_click() {
        let runtime = runtime();
        let mut showroom = showroom_with_cube(&runtime, ProductCategory::Cupcake);
        let mut navigator = RecordingNavigator::default();

        showroom.mouse_button(MouseButton::Left, true, &mut navigator);
        showroom.pointer_moved(VIEWPORT * 0.5 + Vec2::new(40.0, 0.0));
        showroom.pointer_moved(VIEWPORT * 0.5);
        showroom.pointer_moved(VIEWPORT * 0.5 + Vec2::new(40.0, 0.0));
        showroom.mouse_button(MouseButton::Left, false, &mut navigator);

        assert!(navigator.visited.is_empty());
    }

    #[test]
    fn test_drag_back_to_press_point_does_not_click() {
        let runtime = runtime();
        let mut showroom = showroom_with_cube(&runtime, ProductCategory::Cake);
        let mut navigator = RecordingNavigator::default();

        showroom.mouse_button(MouseButton::Left, true, &mut navigator);
        showroom.pointer_moved(VIEWPORT * 0.5 + Vec2::new(300.0, 0.0));
        showroom.pointer_moved(VIEWPORT * 0.5);
        let clicked = showroom.mouse_button(MouseButton::Left, false, &mut navigator);

        assert_eq!(clicked, None);
        assert!(navigator.visited.is_empty());
    }

    #[test]
    fn test_hover_follows_pointer_and_ui_capture() {
        let runtime = runtime();
        let mut showroom = showroom_with_cube(&runtime, ProductCategory::Cookie);

        showroom.update(false);
        assert!(showroom.is_hovering());

        showroom.update(true);
        assert!(!showroom.is_hovering());

        showroom.pointer_moved(Vec2::new(5.0, 5.0));
        showroom.update(false);
        assert!(!showroom.is_hovering());
    }

    #[test]
    fn test_focus_loss_stops_movement() {
        let runtime = runtime();
        let mut showroom = showroom(&runtime);

        showroom.key(KeyCode::KeyW, true);
        showroom.update(false);
        let eye = showroom.camera.eye;
        assert_ne!(eye, ShowroomConfig::default().camera.position);

        showroom.focus_lost();
        showroom.update(false);
        assert!(showroom.camera.eye.abs_diff_eq(eye, 1e-4));
    }
}
