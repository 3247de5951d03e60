//! Product detail and snapshot types.

use crate::error::CommerceError;
use crate::ids::ProductId;
use crate::money::Money;
use serde::{Deserialize, Serialize};

/// Lowest sustainability rating a product can carry.
pub const MIN_RATING: f64 = 0.0;

/// Highest sustainability rating a product can carry.
pub const MAX_RATING: f64 = 100.0;

/// Product fields returned by the catalog's detail endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductDetails {
    /// Product name.
    pub name: String,
    /// Unit price.
    pub price: Money,
    /// Per-product sustainability rating (0-100), if the retailer supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sustainability_rating: Option<f64>,
}

/// A catalog detail response: the product data plus its ordered image URLs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    /// Product data.
    pub data: ProductDetails,
    /// Image URLs, primary image first.
    #[serde(default)]
    pub images: Vec<String>,
}

impl CatalogEntry {
    /// Create an entry without images.
    pub fn new(name: impl Into<String>, price: Money) -> Self {
        Self {
            data: ProductDetails {
                name: name.into(),
                price,
                sustainability_rating: None,
            },
            images: Vec::new(),
        }
    }

    /// Set the sustainability rating.
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.data.sustainability_rating = Some(rating);
        self
    }

    /// Append an image URL.
    pub fn with_image(mut self, url: impl Into<String>) -> Self {
        self.images.push(url.into());
        self
    }
}

/// Point-in-time copy of a product, taken when its cart line was fetched.
///
/// Not live-bound to the catalog: a price or rating change only shows up
/// after the next refresh re-fetches the line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductSnapshot {
    /// Product name.
    pub name: String,
    /// Unit price at fetch time.
    pub price: Money,
    /// Image URLs, primary image first.
    pub images: Vec<String>,
    /// Sustainability rating in `[0, 100]`, if known.
    pub sustainability_rating: Option<f64>,
}

impl ProductSnapshot {
    /// Build a snapshot from a catalog entry.
    ///
    /// Ratings outside `[0, 100]` are clamped; a NaN rating counts as absent.
    /// Negative prices are rejected.
    pub fn from_entry(product_id: &ProductId, entry: CatalogEntry) -> Result<Self, CommerceError> {
        let CatalogEntry { data, images } = entry;
        if data.price.is_negative() {
            return Err(CommerceError::NegativePrice(product_id.to_string()));
        }

        Ok(Self {
            name: data.name,
            price: data.price,
            images,
            sustainability_rating: data
                .sustainability_rating
                .filter(|r| !r.is_nan())
                .map(|r| r.clamp(MIN_RATING, MAX_RATING)),
        })
    }

    /// Primary image, if any.
    pub fn primary_image(&self) -> Option<&str> {
        self.images.first().map(String::as_str)
    }
}
