//! REST client for the catalog `/products` resource.
//!
//! Wraps list, create (multipart upload) and delete calls with
//! [`reqwest`] and turns non-success responses into user-facing
//! messages.

pub mod catalog;
pub mod error;

pub use catalog::CatalogClient;
pub use error::ClientError;
