//! Product catalog panel: fetches the product list once, groups it into fixed sections and
//! shows a gallery modal for one product at a time.

pub mod client;
pub mod images;
pub mod view;

use std::fmt;
use std::sync::mpsc::{Receiver, TryRecvError};

use serde::Deserialize;

use crate::config::CatalogConfig;
use client::{CatalogClient, CatalogError};
use images::{GalleryImages, TextureUploader};

/// Prices are shown exactly as the endpoint sends them, whether as text or as a number.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Text(String),
    Number(serde_json::Number),
}

impl Default for Price {
    fn default() -> Self {
        Price::Text(String::new())
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Price::Text(text) => f.write_str(text),
            Price::Number(number) => write!(f, "{number}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub size: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    /// Comma separated image file names.
    #[serde(default)]
    pub images: String,
}

impl Product {
    /// Image file names in listed order. Entries are not trimmed.
    pub fn image_files(&self) -> Vec<&str> {
        self.images.split(',').collect()
    }

    /// The image shown on the product's card.
    pub fn cover_image(&self) -> Option<&str> {
        self.images.split(',').next().filter(|file| !file.is_empty())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CatalogSection {
    Cakes,
    Cupcakes,
    Cookies,
}

impl CatalogSection {
    pub const ALL: [CatalogSection; 3] = [
        CatalogSection::Cakes,
        CatalogSection::Cupcakes,
        CatalogSection::Cookies,
    ];

    /// The `category` value products in this section carry.
    pub fn key(self) -> &'static str {
        match self {
            CatalogSection::Cakes => "cakes",
            CatalogSection::Cupcakes => "cupcakes",
            CatalogSection::Cookies => "cookies",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            CatalogSection::Cakes => "Cakes",
            CatalogSection::Cupcakes => "Cupcakes",
            CatalogSection::Cookies => "Cookies",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ModalState {
    #[default]
    Closed,
    Open(Product),
}

impl ModalState {
    pub fn product(&self) -> Option<&Product> {
        match self {
            ModalState::Closed => None,
            ModalState::Open(product) => Some(product),
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self, ModalState::Open(_))
    }
}

pub struct ProductCatalog {
    products: Vec<Product>,
    modal: ModalState,
    pending_fetch: Option<Receiver<Result<Vec<Product>, CatalogError>>>,
    pub gallery: GalleryImages,
}

impl ProductCatalog {
    /// Mounts the catalog and starts the one product fetch it makes.
    pub fn mount(config: &CatalogConfig, runtime: tokio::runtime::Handle) -> Self {
        let client = CatalogClient::new(runtime);
        let pending_fetch = Some(client.fetch_products(&config.api_url));

        Self {
            products: Vec::new(),
            modal: ModalState::Closed,
            pending_fetch,
            gallery: GalleryImages::new(client, &config.image_base_url),
        }
    }

    /// Picks up the fetch result and any gallery images that finished downloading.
    pub fn poll(&mut self, uploader: &mut dyn TextureUploader) {
        if let Some(receiver) = &self.pending_fetch {
            match receiver.try_recv() {
                Ok(result) => {
                    self.pending_fetch = None;
                    self.receive_products(result);
                }
                Err(TryRecvError::Disconnected) => {
                    self.pending_fetch = None;
                    log::error!("Error fetching products: request was dropped");
                }
                Err(TryRecvError::Empty) => {}
            }
        }

        self.gallery.poll(uploader);
    }

    fn receive_products(&mut self, result: Result<Vec<Product>, CatalogError>) {
        match result {
            Ok(products) => {
                log::info!("Fetched {} products", products.len());
                self.products = products;
            }
            Err(e) => log::error!("Error fetching products: {e}"),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.pending_fetch.is_some()
    }

    #[cfg(test)]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Products whose category is exactly the section's key, in fetched order.
    pub fn section(&self, section: CatalogSection) -> Vec<&Product> {
        self.products
            .iter()
            .filter(|product| product.category == section.key())
            .collect()
    }

    pub fn open_modal(&mut self, product: Product) {
        self.modal = ModalState::Open(product);
    }

    pub fn close_modal(&mut self) {
        self.modal = ModalState::Closed;
    }

    pub fn modal(&self) -> &ModalState {
        &self.modal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCTS_JSON: &str = r#"[
        { "_id": "1", "name": "Red Velvet", "price": "$65 - 85", "size": "6 in/8 in",
          "category": "cakes", "description": "Layered.", "images": "cake-1.jpg,cake-2.jpg" },
        { "_id": "2", "name": "Vanilla Dozen", "price": 48, "size": "12 Cupcakes",
          "category": "cupcakes", "description": "Buttercream.", "images": "cupcake-1.jpg" },
        { "_id": "3", "name": "Mini Cakes", "price": "$20", "size": "4 in",
          "category": "Cakes", "description": "Wrong case.", "images": "mini.jpg" },
        { "_id": "4", "name": "Chocolate Chip", "price": 2.5, "size": "18 Cookies",
          "category": "cookies", "description": "Crunchy.", "images": "a.jpg, b.jpg,c.jpg" }
    ]"#;

    fn offline_catalog(runtime: &tokio::runtime::Runtime) -> ProductCatalog {
        let client = CatalogClient::new(runtime.handle().clone());
        ProductCatalog {
            products: Vec::new(),
            modal: ModalState::Closed,
            pending_fetch: None,
            gallery: GalleryImages::new(client, "http://localhost:8080/static/img/"),
        }
    }

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap()
    }

    fn products() -> Vec<Product> {
        serde_json::from_str(PRODUCTS_JSON).unwrap()
    }

    #[test]
    fn test_product_fields_deserialize() {
        let products = products();

        assert_eq!(products[0].id, "1");
        assert_eq!(products[0].price.to_string(), "$65 - 85");
        assert_eq!(products[1].price.to_string(), "48");
        assert_eq!(products[3].price.to_string(), "2.5");
    }

    #[test]
    fn test_sections_match_category_exactly() {
        let runtime = runtime();
        let mut catalog = offline_catalog(&runtime);
        catalog.receive_products(Ok(products()));

        for section in CatalogSection::ALL {
            for product in catalog.section(section) {
                assert_eq!(product.category, section.key());
            }
        }

        let cakes: Vec<_> = catalog
            .section(CatalogSection::Cakes)
            .iter()
            .map(|product| product.name.as_str())
            .collect();
        assert_eq!(cakes, vec!["Red Velvet"]);
        assert_eq!(catalog.section(CatalogSection::Cookies).len(), 1);
    }

    #[test]
    fn test_missing_category_yields_empty_section() {
        let runtime = runtime();
        let mut catalog = offline_catalog(&runtime);
        let without_cookies = products()
            .into_iter()
            .filter(|product| product.category != "cookies")
            .collect();
        catalog.receive_products(Ok(without_cookies));

        assert!(catalog.section(CatalogSection::Cookies).is_empty());
        assert_eq!(catalog.section(CatalogSection::Cupcakes).len(), 1);
    }

    #[test]
    fn test_fetch_failure_keeps_empty_list() {
        let runtime = runtime();
        let mut catalog = offline_catalog(&runtime);
        catalog.receive_products(Err(CatalogError::Status(reqwest::StatusCode::BAD_GATEWAY)));

        assert!(catalog.products().is_empty());
        for section in CatalogSection::ALL {
            assert!(catalog.section(section).is_empty());
        }
    }

    #[test]
    fn test_modal_shows_every_image_in_order() {
        let runtime = runtime();
        let mut catalog = offline_catalog(&runtime);
        catalog.receive_products(Ok(products()));

        let cookies = catalog.section(CatalogSection::Cookies)[0].clone();
        catalog.open_modal(cookies);

        let product = catalog.modal().product().unwrap();
        assert_eq!(product.name, "Chocolate Chip");
        assert_eq!(product.image_files(), vec!["a.jpg", " b.jpg", "c.jpg"]);
    }

    #[test]
    fn test_closing_modal_clears_product() {
        let runtime = runtime();
        let mut catalog = offline_catalog(&runtime);
        catalog.receive_products(Ok(products()));

        let cake = catalog.products()[0].clone();
        catalog.open_modal(cake);
        assert!(catalog.modal().is_open());

        catalog.close_modal();
        assert_eq!(catalog.modal(), &ModalState::Closed);
        assert!(catalog.modal().product().is_none());

        // Closing twice is harmless.
        catalog.close_modal();
        assert_eq!(catalog.modal(), &ModalState::Closed);
    }

    #[test]
    fn test_cover_image_is_first_listed() {
        let products = products();
        assert_eq!(products[0].cover_image(), Some("cake-1.jpg"));

        let bare = Product {
            images: String::new(),
            ..products[0].clone()
        };
        assert_eq!(bare.cover_image(), None);
    }
}
