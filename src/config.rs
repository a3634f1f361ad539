use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::category::ProductCategory;

pub const CONFIG_ENV_VAR: &str = "SHOWROOM_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "showroom.json";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShowroomConfig {
    /// Origin the navigation paths are appended to.
    pub site_url: String,
    /// Directory static textures and models are resolved against.
    pub asset_root: PathBuf,
    pub window: WindowConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub movement: MovementConfig,
    pub environment: EnvironmentConfig,
    pub models: Vec<ModelConfig>,
    pub navigation: NavigationConfig,
    /// Where the product catalog mounts. Leaving it out skips the catalog.
    pub catalog: Option<CatalogConfig>,
}

impl Default for ShowroomConfig {
    fn default() -> Self {
        Self {
            site_url: "http://localhost:8080".to_string(),
            asset_root: PathBuf::from("."),
            window: WindowConfig::default(),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            movement: MovementConfig::default(),
            environment: EnvironmentConfig::default(),
            models: default_models(),
            navigation: NavigationConfig::default(),
            catalog: Some(CatalogConfig::default()),
        }
    }
}

impl ShowroomConfig {
    /// Reads the file named by `SHOWROOM_CONFIG`, else `showroom.json` when it exists, else
    /// falls back to the defaults.
    pub fn load() -> Result<Self, ConfigError> {
        if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
            return Self::from_file(Path::new(&path));
        }

        let default_path = Path::new(DEFAULT_CONFIG_FILE);
        if default_path.exists() {
            return Self::from_file(default_path);
        }

        log::info!("No {DEFAULT_CONFIG_FILE} found, using built-in configuration");
        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn asset_path(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.asset_root.join(relative)
    }

    /// Absolute URL for a category's section on the product page.
    pub fn navigation_url(&self, category: ProductCategory) -> String {
        format!(
            "{}{}",
            self.site_url.trim_end_matches('/'),
            self.navigation.path(category)
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Baked by Aisha Showroom".to_string(),
            width: 1600,
            height: 900,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.0, 5.0, 20.0),
            target: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Distance travelled per frame while a movement key is held.
    pub step: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self { step: 0.1 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub floor_texture: PathBuf,
    pub wall_color_texture: PathBuf,
    pub wall_normal_texture: PathBuf,
    pub wall_roughness_texture: PathBuf,
    pub wall_ambient_occlusion_texture: PathBuf,
    pub logo_texture: PathBuf,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            floor_texture: "static/img/floor_tiles_06_diff_4k.jpg".into(),
            wall_color_texture: "static/img/textures/Tiles008_4K-JPG_Color.jpg".into(),
            wall_normal_texture: "static/img/textures/Tiles008_4K-JPG_NormalGL.jpg".into(),
            wall_roughness_texture: "static/img/textures/Tiles008_4K-JPG_Roughness.jpg".into(),
            wall_ambient_occlusion_texture:
                "static/img/textures/Tiles008_4K-JPG_AmbientOcclusion.jpg".into(),
            logo_texture: "static/img/logo.png".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    pub category: ProductCategory,
    pub path: PathBuf,
    /// Offset added after the model is centered and rested on the floor.
    pub placement: Vec3,
    pub scale: f32,
    /// Floating caption drawn above the model.
    #[serde(default)]
    pub label: Option<String>,
}

fn default_models() -> Vec<ModelConfig> {
    vec![
        ModelConfig {
            category: ProductCategory::Cake,
            path: "static/img/candy-covered_cake_draft.glb".into(),
            placement: Vec3::new(-8.0, 6.5, -5.0),
            scale: 2.0,
            label: Some("Cakes".to_string()),
        },
        ModelConfig {
            category: ProductCategory::Cupcake,
            path: "static/img/cupcake.glb".into(),
            placement: Vec3::new(0.0, 1.5, -5.0),
            scale: 1.5,
            label: Some("Cupcakes".to_string()),
        },
        ModelConfig {
            category: ProductCategory::Cookie,
            path: "static/img/cookies_in_the_jar.glb".into(),
            placement: Vec3::new(8.0, 1.5, -5.0),
            scale: 20.0,
            label: Some("Cookies".to_string()),
        },
    ]
}

/// Path and text-fragment anchor of each category's section on the product page.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigationConfig {
    pub cake: String,
    pub cupcake: String,
    pub cookie: String,
}

impl NavigationConfig {
    pub fn path(&self, category: ProductCategory) -> &str {
        match category {
            ProductCategory::Cake => &self.cake,
            ProductCategory::Cupcake => &self.cupcake,
            ProductCategory::Cookie => &self.cookie,
        }
    }
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            cake: "/products#:~:text=Our%20Bakery%20Products-,Cakes,-%2465%20%2D%2085".to_string(),
            cupcake: "/products#:~:text=in/8%20in-,Cupcakes,-%2448".to_string(),
            cookie: "/products#:~:text=Size%3A%2018%20Cupcakes-,Cookies,-Location".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub api_url: String,
    /// Product image file names are appended to this.
    pub image_base_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_url: "http://localhost:8080/api/products".to_string(),
            image_base_url: "http://localhost:8080/static/img".to_string(),
        }
    }
}
