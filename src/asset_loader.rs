use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};

use crate::config::ModelConfig;
use crate::model::MeshError;
use crate::scene_graph::Prefab;

#[derive(Debug, thiserror::Error)]
pub enum AssetLoadError {
    #[error("failed to import {path}: {source}")]
    Import {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error("failed to read meshes from {path}: {source}")]
    Mesh {
        path: PathBuf,
        #[source]
        source: MeshError,
    },
}

pub type LoadOutcome = Result<Prefab, AssetLoadError>;

/// A finished load, paired with the request it answers.
pub struct LoadedModel {
    pub request: ModelConfig,
    pub outcome: LoadOutcome,
}

/// Parses model files on the runtime's blocking pool and hands the results back to the
/// thread that owns the scene. Dropping the loader abandons loads still in flight.
pub struct AssetLoader {
    handle: tokio::runtime::Handle,
    sender: Sender<LoadedModel>,
    receiver: Receiver<LoadedModel>,
}

impl AssetLoader {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        let (sender, receiver) = channel();

        Self {
            handle,
            sender,
            receiver,
        }
    }

    /// Starts loading `request.path`, resolved against `asset_root`.
    pub fn load(&self, request: ModelConfig, asset_root: &Path) {
        let path = asset_root.join(&request.path);
        let sender = self.sender.clone();

        log::debug!("Loading {}", path.display());

        self.handle.spawn_blocking(move || {
            let outcome = load_prefab(&path);
            // The receiver is gone if the loader was dropped; nobody wants the result.
            let _ = sender.send(LoadedModel { request, outcome });
        });
    }

    /// Results that arrived since the last call. Never blocks.
    pub fn drain(&self) -> Vec<LoadedModel> {
        self.receiver.try_iter().collect()
    }
}

pub fn load_prefab(path: &Path) -> LoadOutcome {
    let (document, buffers, images) =
        gltf::import(path).map_err(|source| AssetLoadError::Import {
            path: path.to_path_buf(),
            source,
        })?;

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Prefab::from_gltf(name, &document, &buffers, &images).map_err(|source| AssetLoadError::Mesh {
        path: path.to_path_buf(),
        source,
    })
}
