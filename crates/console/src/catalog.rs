//! Seam between the controller and the remote catalog.

use almirah_client::{CatalogClient, ClientError};
use almirah_core::image_intake::ImageFile;
use almirah_core::product::{Category, NewProduct, Product};
use almirah_core::types::DbId;
use async_trait::async_trait;

/// Remote catalog operations the controller depends on.
///
/// Implemented by [`CatalogClient`]; tests substitute an in-memory double.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_products(&self, category: Option<&Category>)
        -> Result<Vec<Product>, ClientError>;

    async fn create_product(
        &self,
        product: &NewProduct,
        image: &ImageFile,
    ) -> Result<Product, ClientError>;

    async fn delete_product(&self, id: DbId) -> Result<(), ClientError>;

    /// Whether an image URL can be loaded.
    async fn image_available(&self, url: &str) -> bool;

    /// Map a stored `image_url` to a loadable URL.
    fn resolve_image_url(&self, image_url: &str) -> String;
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn list_products(
        &self,
        category: Option<&Category>,
    ) -> Result<Vec<Product>, ClientError> {
        CatalogClient::list_products(self, category).await
    }

    async fn create_product(
        &self,
        product: &NewProduct,
        image: &ImageFile,
    ) -> Result<Product, ClientError> {
        CatalogClient::create_product(self, product, image).await
    }

    async fn delete_product(&self, id: DbId) -> Result<(), ClientError> {
        CatalogClient::delete_product(self, id).await
    }

    async fn image_available(&self, url: &str) -> bool {
        CatalogClient::image_available(self, url).await
    }

    fn resolve_image_url(&self, image_url: &str) -> String {
        CatalogClient::resolve_image_url(self, image_url)
    }
}
