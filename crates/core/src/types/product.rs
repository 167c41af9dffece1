//! Product and category records as served by the MartAfrica API.
//!
//! These are cached, read-only copies. Listing and detail endpoints return
//! different subsets of fields, so everything beyond id, name and price is
//! optional.

use serde::{Deserialize, Serialize};

use super::id::{CategoryId, ProductId};
use super::price::Price;

/// A product image.
///
/// The API has served images both as bare URL strings and as objects with an
/// `image` or `url` field; all shapes normalize to [`ProductImage::src`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductImage {
    Url(String),
    Object {
        #[serde(default, alias = "image")]
        url: Option<String>,
        #[serde(default)]
        alt_text: Option<String>,
    },
}

impl ProductImage {
    /// Image source, if the record carries one.
    #[must_use]
    pub fn src(&self) -> Option<&str> {
        match self {
            Self::Url(url) => Some(url.as_str()),
            Self::Object { url, .. } => url.as_deref(),
        }
        .filter(|s| !s.is_empty())
    }

    /// Alt text, if provided.
    #[must_use]
    pub fn alt_text(&self) -> Option<&str> {
        match self {
            Self::Url(_) => None,
            Self::Object { alt_text, .. } => alt_text.as_deref(),
        }
    }
}

/// Category reference embedded in product detail responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRef {
    pub id: CategoryId,
    pub name: String,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// A product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub primary_image: Option<ProductImage>,
    /// Units left, reported as `qty_left`.
    #[serde(default, alias = "qty_left")]
    pub stock: Option<i64>,
    #[serde(default)]
    pub is_in_stock: Option<bool>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    #[serde(default)]
    pub category: Option<CategoryRef>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub average_rating: Option<f64>,
    #[serde(default, alias = "user_name")]
    pub seller_name: Option<String>,
}

impl Product {
    /// Primary image source, falling back to the first gallery image.
    #[must_use]
    pub fn primary_image_src(&self) -> Option<&str> {
        self.primary_image
            .as_ref()
            .and_then(ProductImage::src)
            .or_else(|| self.images.iter().find_map(ProductImage::src))
    }

    /// Whether the product can be added to the cart.
    ///
    /// Uses the explicit flag when present, otherwise the stock count. A
    /// product with neither is assumed available.
    #[must_use]
    pub fn in_stock(&self) -> bool {
        self.is_in_stock
            .unwrap_or_else(|| self.stock.is_none_or(|qty| qty > 0))
    }

    /// Category label from either the embedded category or the flat name.
    #[must_use]
    pub fn category_label(&self) -> Option<&str> {
        self.category
            .as_ref()
            .map(|c| c.name.as_str())
            .or(self.category_name.as_deref())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_shape() {
        let json = r#"{
            "id": 3,
            "name": "Kente Scarf",
            "brand": "Accra Weavers",
            "category_name": "Fashion",
            "price": 25.5,
            "primary_image": {"url": "https://res.cloudinary.com/x/kente.jpg", "alt_text": "scarf"},
            "qty_left": 4,
            "is_in_stock": true
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(3));
        assert_eq!(product.price, Price::from_cents(2550));
        assert_eq!(product.stock, Some(4));
        assert_eq!(
            product.primary_image_src(),
            Some("https://res.cloudinary.com/x/kente.jpg")
        );
        assert_eq!(product.category_label(), Some("Fashion"));
        assert!(product.in_stock());
    }

    #[test]
    fn test_detail_shape() {
        let json = r#"{
            "id": 9,
            "name": "Shea Butter",
            "price": "8.00",
            "description": "Raw, unrefined",
            "images": [{"id": 1, "image": "image/upload/shea.png", "alt_text": ""}],
            "category": {"id": 2, "name": "Beauty"},
            "is_in_stock": false,
            "user_name": "Amina"
        }"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.primary_image_src(), Some("image/upload/shea.png"));
        assert_eq!(product.category_label(), Some("Beauty"));
        assert_eq!(product.seller_name.as_deref(), Some("Amina"));
        assert!(!product.in_stock());
    }

    #[test]
    fn test_bare_string_image_and_minimal_record() {
        let json = r#"{"id": 1, "name": "A", "price": "10.00", "primary_image": "a.jpg"}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.primary_image_src(), Some("a.jpg"));
        assert!(product.in_stock());
    }

    #[test]
    fn test_stock_zero_without_flag_is_out_of_stock() {
        let json = r#"{"id": 1, "name": "A", "price": 1, "qty_left": 0}"#;
        let product: Product = serde_json::from_str(json).unwrap();
        assert!(!product.in_stock());
    }
}
