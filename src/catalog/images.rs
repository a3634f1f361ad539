use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};

use crate::asset_pipeline::texture_image::TextureImage;
use crate::catalog::client::{CatalogClient, CatalogError};

/// Turns decoded pixels into something the UI can draw.
pub trait TextureUploader {
    fn upload(&mut self, image: &TextureImage) -> imgui::TextureId;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageSlot {
    Loading,
    Ready {
        texture_id: imgui::TextureId,
        size: [f32; 2],
    },
    Failed,
}

type ImageResult = (String, Result<TextureImage, CatalogError>);

/// Product images by file name. Each file is requested the first time it is shown and kept
/// for the rest of the session, failures included.
pub struct GalleryImages {
    client: CatalogClient,
    base_url: String,
    slots: HashMap<String, ImageSlot>,
    sender: Sender<ImageResult>,
    receiver: Receiver<ImageResult>,
}

impl GalleryImages {
    pub fn new(client: CatalogClient, base_url: &str) -> Self {
        let (sender, receiver) = channel();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            slots: HashMap::new(),
            sender,
            receiver,
        }
    }

    pub fn url(&self, file: &str) -> String {
        format!("{}/{}", self.base_url, file)
    }

    /// The image's current state, starting its download on first use.
    pub fn get(&mut self, file: &str) -> ImageSlot {
        if let Some(slot) = self.slots.get(file) {
            return *slot;
        }

        self.slots.insert(file.to_string(), ImageSlot::Loading);
        self.client
            .fetch_image(file.to_string(), self.url(file), self.sender.clone());

        ImageSlot::Loading
    }

    pub fn poll(&mut self, uploader: &mut dyn TextureUploader) {
        while let Ok((file, result)) = self.receiver.try_recv() {
            self.complete(file, result, uploader);
        }
    }

    fn complete(
        &mut self,
        file: String,
        result: Result<TextureImage, CatalogError>,
        uploader: &mut dyn TextureUploader,
    ) {
        let slot = match result {
            Ok(image) => ImageSlot::Ready {
                texture_id: uploader.upload(&image),
                size: [image.width as f32, image.height as f32],
            },
            Err(e) => {
                log::warn!("Product image {file} unavailable: {e}");
                ImageSlot::Failed
            }
        };

        self.slots.insert(file, slot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeUploader {
        uploaded: Vec<(u32, u32)>,
    }

    impl TextureUploader for FakeUploader {
        fn upload(&mut self, image: &TextureImage) -> imgui::TextureId {
            self.uploaded.push((image.width, image.height));
            imgui::TextureId::new(self.uploaded.len())
        }
    }

    fn gallery(runtime: &tokio::runtime::Runtime) -> GalleryImages {
        GalleryImages::new(
            CatalogClient::new(runtime.handle().clone()),
            "http://localhost:8080/static/img/",
        )
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap()
    }

    #[test]
    fn test_url_joins_base_and_file() {
        let runtime = runtime();
        let gallery = gallery(&runtime);
        assert_eq!(
            gallery.url("cake-1.jpg"),
            "http://localhost:8080/static/img/cake-1.jpg"
        );
    }

    #[test]
    fn test_completed_images_are_uploaded_once() {
        let runtime = runtime();
        let mut gallery = gallery(&runtime);
        let mut uploader = FakeUploader::default();

        gallery.complete(
            "cake-1.jpg".to_string(),
            Ok(TextureImage::solid([255, 0, 0, 255])),
            &mut uploader,
        );

        let slot = gallery.get("cake-1.jpg");
        assert_eq!(
            slot,
            ImageSlot::Ready {
                texture_id: imgui::TextureId::new(1),
                size: [1.0, 1.0],
            }
        );
        assert_eq!(gallery.get("cake-1.jpg"), slot);
        assert_eq!(uploader.uploaded, vec![(1, 1)]);
    }

    #[test]
    fn test_failed_image_is_remembered() {
        let runtime = runtime();
        let mut gallery = gallery(&runtime);
        let mut uploader = FakeUploader::default();

        gallery.complete(
            "missing.jpg".to_string(),
            Err(CatalogError::Status(reqwest::StatusCode::NOT_FOUND)),
            &mut uploader,
        );

        assert_eq!(gallery.get("missing.jpg"), ImageSlot::Failed);
        assert!(uploader.uploaded.is_empty());
    }
}
