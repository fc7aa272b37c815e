//! Create-form validation. Pure logic, no I/O.
//!
//! [`validate_draft`] recomputes the full error set for a draft; the
//! caller blocks submission whenever the returned [`FieldErrors`] is
//! non-empty.

use std::collections::BTreeMap;

use crate::product::{Field, NewProduct, ProductDraft};

pub const MSG_NAME_REQUIRED: &str = "Name is required";
pub const MSG_PRICE_REQUIRED: &str = "Price is required";
pub const MSG_PRICE_POSITIVE: &str = "Price must be a positive number";
pub const MSG_DISCOUNT_POSITIVE: &str = "Discount price must be a positive number";
pub const MSG_IMAGE_REQUIRED: &str = "Please upload an image";
pub const MSG_BRAND_REQUIRED: &str = "Brand is required";

/// Field-scoped error messages, iterated in form order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(BTreeMap<Field, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the message for a field, replacing any previous one.
    pub fn insert(&mut self, field: Field, message: impl Into<String>) {
        self.0.insert(field, message.into());
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        self.0.get(&field).map(String::as_str)
    }

    pub fn contains(&self, field: Field) -> bool {
        self.0.contains_key(&field)
    }

    /// Drop the message for one field; used when the user edits it.
    pub fn clear(&mut self, field: Field) {
        self.0.remove(&field);
    }

    pub fn clear_all(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, &str)> {
        self.0.iter().map(|(f, m)| (*f, m.as_str()))
    }
}

/// Validate every rule of the create form.
///
/// `image_attached` reports whether the image intake currently holds an
/// accepted file. The discount price is not compared with the price.
pub fn validate_draft(draft: &ProductDraft, image_attached: bool) -> FieldErrors {
    let mut errors = FieldErrors::new();

    if is_blank(&draft.name) {
        errors.insert(Field::Name, MSG_NAME_REQUIRED);
    }

    if is_blank(&draft.price) {
        errors.insert(Field::Price, MSG_PRICE_REQUIRED);
    } else if parse_positive(&draft.price).is_none() {
        errors.insert(Field::Price, MSG_PRICE_POSITIVE);
    }

    if !is_blank(&draft.discount_price) && parse_positive(&draft.discount_price).is_none() {
        errors.insert(Field::DiscountPrice, MSG_DISCOUNT_POSITIVE);
    }

    if !image_attached {
        errors.insert(Field::Image, MSG_IMAGE_REQUIRED);
    }

    if is_blank(&draft.brand) {
        errors.insert(Field::Brand, MSG_BRAND_REQUIRED);
    }

    errors
}

/// Parse a finite, strictly positive number from trimmed text.
pub fn parse_positive(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v > 0.0)
}

fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl ProductDraft {
    /// Validate the draft and parse it into the payload sent to the server.
    ///
    /// Text fields are trimmed; an empty description or discount price is
    /// omitted.
    pub fn to_new_product(&self, image_attached: bool) -> Result<NewProduct, FieldErrors> {
        let mut errors = validate_draft(self, image_attached);
        let price = parse_positive(&self.price);
        let Some(price) = price.filter(|_| errors.is_empty()) else {
            if errors.is_empty() {
                errors.insert(Field::Price, MSG_PRICE_POSITIVE);
            }
            return Err(errors);
        };

        Ok(NewProduct {
            name: self.name.trim().to_string(),
            brand: self.brand.trim().to_string(),
            category: self.category.clone(),
            price,
            description: non_blank(&self.description),
            discount_price: parse_positive(&self.discount_price),
        })
    }
}
