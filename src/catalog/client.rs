use std::sync::mpsc::{channel, Receiver, Sender};

use crate::asset_pipeline::texture_image::{TextureImage, TextureImageError};
use crate::catalog::Product;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("server answered {0}")]
    Status(reqwest::StatusCode),
    #[error(transparent)]
    Image(#[from] TextureImageError),
    #[error("image decoding was interrupted: {0}")]
    Interrupted(#[from] tokio::task::JoinError),
}

/// HTTP access for the catalog. Requests run on the runtime and report back over channels,
/// so callers on the UI thread never wait.
#[derive(Clone)]
pub struct CatalogClient {
    http: reqwest::Client,
    runtime: tokio::runtime::Handle,
}

impl CatalogClient {
    pub fn new(runtime: tokio::runtime::Handle) -> Self {
        Self {
            http: reqwest::Client::new(),
            runtime,
        }
    }

    pub fn fetch_products(&self, url: &str) -> Receiver<Result<Vec<Product>, CatalogError>> {
        let (sender, receiver) = channel();
        let http = self.http.clone();
        let url = url.to_string();

        self.runtime.spawn(async move {
            log::debug!("GET {url}");
            let result = get_products(&http, &url).await;
            let _ = sender.send(result);
        });

        receiver
    }

    /// Downloads and decodes one image, sending the result tagged with `key`.
    pub fn fetch_image(
        &self,
        key: String,
        url: String,
        sender: Sender<(String, Result<TextureImage, CatalogError>)>,
    ) {
        let http = self.http.clone();

        self.runtime.spawn(async move {
            let result = match get_bytes(&http, &url).await {
                Ok(bytes) => decode_image(url, bytes).await,
                Err(e) => Err(e),
            };
            let _ = sender.send((key, result));
        });
    }
}

async fn get(http: &reqwest::Client, url: &str) -> Result<reqwest::Response, CatalogError> {
    let response = http.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::Status(status));
    }

    Ok(response)
}

async fn get_products(http: &reqwest::Client, url: &str) -> Result<Vec<Product>, CatalogError> {
    Ok(get(http, url).await?.json().await?)
}

async fn get_bytes(http: &reqwest::Client, url: &str) -> Result<Vec<u8>, CatalogError> {
    Ok(get(http, url).await?.bytes().await?.to_vec())
}

/// Decodes on the blocking pool so large photos don't stall the async workers.
async fn decode_image(url: String, bytes: Vec<u8>) -> Result<TextureImage, CatalogError> {
    let image =
        tokio::task::spawn_blocking(move || TextureImage::from_bytes(&url, &bytes)).await??;
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undecodable_download_is_an_image_error() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .build()
            .unwrap();

        let result = runtime.block_on(decode_image(
            "http://localhost:8080/static/images/cake.jpg".to_string(),
            b"<html>not found</html>".to_vec(),
        ));

        assert!(matches!(result, Err(CatalogError::Image(_))));
    }
}
