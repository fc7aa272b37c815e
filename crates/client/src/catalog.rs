//! HTTP client for the catalog resource.
//!
//! | Operation | Request                              |
//! |-----------|--------------------------------------|
//! | list      | `GET {base}/products[?category=..]`  |
//! | create    | `POST {base}/products` (multipart)   |
//! | delete    | `DELETE {base}/products/{id}`        |

use almirah_core::image_intake::ImageFile;
use almirah_core::product::{Category, NewProduct, Product};
use almirah_core::types::DbId;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use serde_json::Value;

use crate::error::ClientError;

/// Error text for a failed delete.
pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete product";

/// Client for one catalog service.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    /// Create a client for a catalog host.
    ///
    /// * `base_url` - Host URL without the resource path, e.g.
    ///   `http://127.0.0.1:8000`. A trailing slash is ignored.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn products_url(&self) -> String {
        format!("{}/products", self.base_url)
    }

    /// Fetch all products in server order, optionally restricted to one
    /// category.
    pub async fn list_products(
        &self,
        category: Option<&Category>,
    ) -> Result<Vec<Product>, ClientError> {
        let mut request = self.client.get(self.products_url());
        if let Some(category) = category {
            request = request.query(&[("category", category.as_str())]);
        }

        tracing::debug!(url = %self.products_url(), ?category, "Listing products");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: list_failure_message(status),
            });
        }

        let products: Vec<Product> = response.json().await?;
        tracing::info!(count = products.len(), "Products loaded");
        Ok(products)
    }

    /// Create a product with its image as a multipart upload.
    ///
    /// Returns the stored product, including its server-assigned id.
    pub async fn create_product(
        &self,
        product: &NewProduct,
        image: &ImageFile,
    ) -> Result<Product, ClientError> {
        let form = build_create_form(product, image)?;

        tracing::debug!(
            name = %product.name,
            image = %image.file_name(),
            size = image.size(),
            "Creating product",
        );
        let response = self
            .client
            .post(self.products_url())
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = extract_error_message(&body)
                .unwrap_or_else(|| format!("Server error: {}", status.as_u16()));
            tracing::warn!(status = status.as_u16(), %message, "Create product rejected");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let created: Product = response.json().await?;
        tracing::info!(id = created.id, name = %created.name, "Product created");
        Ok(created)
    }

    /// Delete a product by id. Any 2xx status counts as success.
    pub async fn delete_product(&self, id: DbId) -> Result<(), ClientError> {
        let response = self
            .client
            .delete(format!("{}/{id}", self.products_url()))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(id, status = status.as_u16(), "Delete product rejected");
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: DELETE_FAILED_MESSAGE.to_string(),
            });
        }

        tracing::info!(id, "Product deleted");
        Ok(())
    }

    /// Whether an image URL loads with a success status.
    pub async fn image_available(&self, url: &str) -> bool {
        if url.starts_with("data:") {
            return true;
        }
        match self.client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::debug!(url, error = %e, "Image probe failed");
                false
            }
        }
    }

    /// Turn a stored `image_url` into something loadable.
    ///
    /// Server-relative paths (leading `/`) are joined onto the host;
    /// absolute and `data:` URLs are returned unchanged.
    pub fn resolve_image_url(&self, image_url: &str) -> String {
        if image_url.starts_with('/') {
            format!("{}{image_url}", self.base_url)
        } else {
            image_url.to_string()
        }
    }
}

// ---- private helpers ----

fn build_create_form(product: &NewProduct, image: &ImageFile) -> Result<Form, ClientError> {
    let image_part = Part::bytes(image.bytes().to_vec())
        .file_name(image.file_name().to_string())
        .mime_str(image.content_type())?;

    let mut form = Form::new()
        .text("name", product.name.clone())
        .text("brand", product.brand.clone())
        .text("category", product.category.to_string())
        .text("price", product.price.to_string());

    if let Some(description) = &product.description {
        form = form.text("description", description.clone());
    }
    if let Some(discount_price) = product.discount_price {
        form = form.text("discount_price", discount_price.to_string());
    }

    Ok(form.part("image", image_part))
}

fn list_failure_message(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("Failed to fetch products: {} {reason}", status.as_u16()),
        None => format!("Failed to fetch products: {}", status.as_u16()),
    }
}

/// Pull a message out of an error body: `detail`, then `message`.
///
/// A `detail` list (request validation failures) yields the first
/// entry's `msg`.
fn extract_error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    message_from(value.get("detail")).or_else(|| message_from(value.get("message")))
}

fn message_from(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Array(items) => items
            .first()?
            .get("msg")?
            .as_str()
            .map(str::to_string),
        _ => None,
    }
}
