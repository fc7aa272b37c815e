//! Catalog admin domain logic.
//!
//! Product and draft types, draft validation, image intake with
//! background preview encoding, and the single-slot toast presenter.
//! Nothing in this crate performs network I/O.

pub mod error;
pub mod image_intake;
pub mod notification;
pub mod product;
pub mod types;
pub mod validation;
