//! Catalog product types and the create-form draft.
//!
//! [`Product`] mirrors the JSON objects served by the catalog resource.
//! [`ProductDraft`] holds the raw text of the create form before it is
//! validated and parsed into a [`NewProduct`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Product category.
///
/// The create form only offers the three fixed categories. Values the
/// server returns outside that set are kept verbatim in
/// [`Category::Other`] so a listing never fails on them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    #[default]
    Men,
    Women,
    Kids,
    Other(String),
}

impl Category {
    /// Categories selectable in the create form, in display order.
    pub const SELECTABLE: [Category; 3] = [Category::Men, Category::Women, Category::Kids];

    pub fn as_str(&self) -> &str {
        match self {
            Category::Men => "Men",
            Category::Women => "Women",
            Category::Kids => "Kids",
            Category::Other(name) => name,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Men" => Category::Men,
            "Women" => Category::Women,
            "Kids" => Category::Kids,
            _ => Category::Other(value),
        }
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

/// Parses user input. Only the selectable categories are accepted,
/// matched case-insensitively.
impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Category::SELECTABLE
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Unknown category '{trimmed}': expected Men, Women or Kids"
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Product
// ---------------------------------------------------------------------------

/// A persisted catalog product as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: DbId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    #[serde(default)]
    pub discount_price: Option<f64>,
    /// Absolute URL, data URL, or a server-relative path such as
    /// `/static/images/<file>`.
    pub image_url: String,
    pub category: Category,
    pub brand: String,
    #[serde(default)]
    pub rating: f64,
}

impl Product {
    /// The price to show in the product grid.
    ///
    /// A discount is only shown when it is positive and below the regular
    /// price; otherwise the regular price is shown alone.
    pub fn price_display(&self) -> PriceDisplay {
        match self.discount_price {
            Some(discount) if discount > 0.0 && discount < self.price => PriceDisplay::Discounted {
                price: discount,
                original: self.price,
            },
            _ => PriceDisplay::Regular(self.price),
        }
    }
}

/// Rendered price of a product.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PriceDisplay {
    Regular(f64),
    Discounted { price: f64, original: f64 },
}

impl fmt::Display for PriceDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceDisplay::Regular(price) => write!(f, "${price:.2}"),
            PriceDisplay::Discounted { price, original } => {
                write!(f, "${price:.2} (was ${original:.2})")
            }
        }
    }
}

/// Validated, parsed fields of a product to be created.
///
/// The image travels separately as an
/// [`ImageFile`](crate::image_intake::ImageFile).
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub brand: String,
    pub category: Category,
    pub price: f64,
    pub description: Option<String>,
    pub discount_price: Option<f64>,
}

// ---------------------------------------------------------------------------
// Form fields and draft
// ---------------------------------------------------------------------------

/// A field of the create form.
///
/// Declaration order is form order, which is also the iteration order of
/// [`FieldErrors`](crate::validation::FieldErrors).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Field {
    Name,
    Description,
    Price,
    DiscountPrice,
    Image,
    Category,
    Brand,
}

impl Field {
    /// Multipart / JSON name of the field.
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Description => "description",
            Field::Price => "price",
            Field::DiscountPrice => "discount_price",
            Field::Image => "image",
            Field::Category => "category",
            Field::Brand => "brand",
        }
    }

    /// Human label used by the form view.
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Name",
            Field::Description => "Description",
            Field::Price => "Price",
            Field::DiscountPrice => "Discount Price",
            Field::Image => "Product Image",
            Field::Category => "Category",
            Field::Brand => "Brand",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "name" => Ok(Field::Name),
            "description" | "desc" => Ok(Field::Description),
            "price" => Ok(Field::Price),
            "discount_price" | "discount" => Ok(Field::DiscountPrice),
            "image" => Ok(Field::Image),
            "category" => Ok(Field::Category),
            "brand" => Ok(Field::Brand),
            other => Err(CoreError::UnknownField(other.to_string())),
        }
    }
}

/// Unsaved create-form input. All text is kept exactly as typed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: String,
    pub discount_price: String,
    pub category: Category,
    pub brand: String,
}

impl ProductDraft {
    /// Replace the value of a form field.
    ///
    /// The category is parsed from `value`; the image is not a text field
    /// and is rejected.
    pub fn set(&mut self, field: Field, value: impl Into<String>) -> Result<(), CoreError> {
        let value = value.into();
        match field {
            Field::Name => self.name = value,
            Field::Description => self.description = value,
            Field::Price => self.price = value,
            Field::DiscountPrice => self.discount_price = value,
            Field::Brand => self.brand = value,
            Field::Category => self.category = value.parse()?,
            Field::Image => {
                return Err(CoreError::Validation(
                    "The image is attached through the image intake, not as text".to_string(),
                ))
            }
        }
        Ok(())
    }

    /// Current text of a form field. The image has no text and yields `None`.
    pub fn get(&self, field: Field) -> Option<&str> {
        match field {
            Field::Name => Some(&self.name),
            Field::Description => Some(&self.description),
            Field::Price => Some(&self.price),
            Field::DiscountPrice => Some(&self.discount_price),
            Field::Category => Some(self.category.as_str()),
            Field::Brand => Some(&self.brand),
            Field::Image => None,
        }
    }
}
