//! In-memory catalog double for controller and shell tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use almirah_client::ClientError;
use almirah_console::catalog::CatalogApi;
use almirah_core::image_intake::ImageFile;
use almirah_core::product::{Category, NewProduct, Product};
use almirah_core::types::DbId;
use async_trait::async_trait;

/// Host the double pretends to serve images from.
pub const FAKE_HOST: &str = "http://catalog.test";

/// PNG signature followed by filler. The content is never decoded.
pub const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n-almirah-test-image";

#[derive(Default)]
pub struct FakeCatalog {
    pub products: Mutex<Vec<Product>>,
    next_id: Mutex<DbId>,
    /// When set, listing fails with this status and message.
    pub list_failure: Mutex<Option<(u16, String)>>,
    /// When set, creating fails with this status and message.
    pub create_failure: Mutex<Option<(u16, String)>>,
    /// When set, deleting fails with this status.
    pub delete_failure: Mutex<Option<u16>>,
    /// Image URLs that report as unavailable.
    pub missing_images: Mutex<HashSet<String>>,
    /// Every accepted create payload with the uploaded file name.
    pub created: Mutex<Vec<(NewProduct, String)>>,
    pub list_calls: AtomicUsize,
    pub create_calls: AtomicUsize,
    pub delete_calls: AtomicUsize,
    pub last_filter: Mutex<Option<Category>>,
}

impl FakeCatalog {
    pub fn with_products(products: Vec<Product>) -> Self {
        let next = products.iter().map(|p| p.id).max().unwrap_or(0) + 1;
        Self {
            products: Mutex::new(products),
            next_id: Mutex::new(next),
            ..Default::default()
        }
    }

    pub fn fail_list(&self, status: u16, message: &str) {
        *self.list_failure.lock().unwrap() = Some((status, message.to_string()));
    }

    pub fn fail_create(&self, status: u16, message: &str) {
        *self.create_failure.lock().unwrap() = Some((status, message.to_string()));
    }

    pub fn fail_delete(&self, status: u16) {
        *self.delete_failure.lock().unwrap() = Some(status);
    }

    pub fn mark_missing(&self, url: &str) {
        self.missing_images.lock().unwrap().insert(url.to_string());
    }

    pub fn creates(&self) -> usize {
        self.create_calls.load(Ordering::SeqCst)
    }

    pub fn deletes(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn lists(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CatalogApi for FakeCatalog {
    async fn list_products(
        &self,
        category: Option<&Category>,
    ) -> Result<Vec<Product>, ClientError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        *self.last_filter.lock().unwrap() = category.cloned();
        if let Some((status, message)) = self.list_failure.lock().unwrap().clone() {
            return Err(ClientError::Api { status, message });
        }
        let products = self.products.lock().unwrap();
        Ok(products
            .iter()
            .filter(|p| category.map_or(true, |c| &p.category == c))
            .cloned()
            .collect())
    }

    async fn create_product(
        &self,
        product: &NewProduct,
        image: &ImageFile,
    ) -> Result<Product, ClientError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);
        if let Some((status, message)) = self.create_failure.lock().unwrap().clone() {
            return Err(ClientError::Api { status, message });
        }

        let id = {
            let mut next = self.next_id.lock().unwrap();
            let id = (*next).max(1);
            *next = id + 1;
            id
        };
        let stored = Product {
            id,
            name: product.name.clone(),
            description: product.description.clone(),
            price: product.price,
            discount_price: product.discount_price,
            image_url: format!("/static/images/{}", image.file_name()),
            category: product.category.clone(),
            brand: product.brand.clone(),
            rating: 0.0,
        };
        self.products.lock().unwrap().push(stored.clone());
        self.created
            .lock()
            .unwrap()
            .push((product.clone(), image.file_name().to_string()));
        Ok(stored)
    }

    async fn delete_product(&self, id: DbId) -> Result<(), ClientError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = *self.delete_failure.lock().unwrap() {
            return Err(ClientError::Api {
                status,
                message: "Failed to delete product".to_string(),
            });
        }
        self.products.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }

    async fn image_available(&self, url: &str) -> bool {
        !self.missing_images.lock().unwrap().contains(url)
    }

    fn resolve_image_url(&self, image_url: &str) -> String {
        if image_url.starts_with('/') {
            format!("{FAKE_HOST}{image_url}")
        } else {
            image_url.to_string()
        }
    }
}

pub fn product(id: DbId, name: &str, category: Category) -> Product {
    Product {
        id,
        name: name.to_string(),
        description: None,
        price: 25.0,
        discount_price: None,
        image_url: format!("/static/images/{id}.png"),
        category,
        brand: "Almirah".to_string(),
        rating: 0.0,
    }
}

/// Two products already in the catalog.
pub fn seeded() -> FakeCatalog {
    FakeCatalog::with_products(vec![
        product(1, "Linen Shirt", Category::Men),
        product(2, "Wrap Dress", Category::Women),
    ])
}

pub fn png(name: &str) -> ImageFile {
    ImageFile::new(name, "image/png", PNG_BYTES.to_vec())
}
