//! Persisted cart record.
//!
//! A cart is stored under a single key as a JSON array of
//! `{id, name, price, primary_image, quantity}` objects in cart order:
//!
//! ```json
//! [{"id": 1, "name": "A", "price": "10.00", "primary_image": "a.jpg", "quantity": 2}]
//! ```
//!
//! Decoding is lenient about values (string or number prices, image objects,
//! out-of-range quantities) but rejects anything that is not an array of
//! objects with an id.

use serde::{Deserialize, Serialize};

use super::{Cart, CartLine};
use crate::types::{Price, ProductId, ProductImage};

#[derive(Serialize)]
struct LineRef<'a> {
    id: ProductId,
    name: &'a str,
    price: Price,
    primary_image: Option<&'a str>,
    quantity: u32,
}

#[derive(Deserialize)]
struct RawLine {
    id: ProductId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    price: Price,
    #[serde(default)]
    primary_image: Option<ProductImage>,
    #[serde(default = "default_quantity")]
    quantity: i64,
}

const fn default_quantity() -> i64 {
    1
}

impl RawLine {
    fn into_line(self) -> Option<CartLine> {
        let quantity = u32::try_from(self.quantity.max(0)).unwrap_or(u32::MAX);
        (quantity > 0).then(|| CartLine {
            id: self.id,
            name: self.name,
            price: self.price,
            primary_image: self
                .primary_image
                .as_ref()
                .and_then(ProductImage::src)
                .map(str::to_owned),
            quantity,
        })
    }
}

/// Serialize a cart to its persisted form.
///
/// # Errors
///
/// Returns an error only if `serde_json` fails to write, which does not
/// happen for in-memory strings.
pub fn encode(cart: &Cart) -> Result<String, serde_json::Error> {
    let lines: Vec<LineRef<'_>> = cart
        .lines()
        .iter()
        .map(|l| LineRef {
            id: l.id,
            name: &l.name,
            price: l.price,
            primary_image: l.primary_image.as_deref(),
            quantity: l.quantity,
        })
        .collect();
    serde_json::to_string(&lines)
}

/// Parse a persisted record.
///
/// Lines with a non-positive quantity are dropped and duplicate ids merged,
/// so the result always satisfies the cart invariants.
///
/// # Errors
///
/// Returns the JSON error when the record is not a valid cart array.
pub fn decode(raw: &str) -> Result<Cart, serde_json::Error> {
    let lines: Vec<RawLine> = serde_json::from_str(raw)?;
    Ok(Cart::from_lines(lines.into_iter().filter_map(RawLine::into_line)))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cart::ProductSnapshot;

    fn sample_cart() -> Cart {
        let mut cart = Cart::new();
        for (id, price, image) in [(2, "3.25", Some("b.jpg")), (1, "10.00", None)] {
            cart.add(ProductSnapshot {
                id: ProductId::new(id),
                name: format!("Item {id}"),
                price: Price::parse_lenient(price),
                primary_image: image.map(str::to_owned),
            });
        }
        cart.add(ProductSnapshot {
            id: ProductId::new(1),
            name: "Item 1".to_string(),
            price: Price::parse_lenient("10.00"),
            primary_image: None,
        });
        cart
    }

    #[test]
    fn test_encode_then_decode_preserves_lines_and_order() {
        let cart = sample_cart();
        let decoded = decode(&encode(&cart).unwrap()).unwrap();
        assert_eq!(decoded, cart);
    }

    #[test]
    fn test_encode_shape() {
        let raw = encode(&sample_cart()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!([
                {"id": 2, "name": "Item 2", "price": "3.25", "primary_image": "b.jpg", "quantity": 1},
                {"id": 1, "name": "Item 1", "price": "10.00", "primary_image": null, "quantity": 2}
            ])
        );
    }

    #[test]
    fn test_decode_rejects_non_json() {
        assert!(decode("not json").is_err());
        assert!(decode("{\"cart\": []}").is_err());
    }

    #[test]
    fn test_decode_tolerates_legacy_values() {
        let raw = r#"[
            {"id": 1, "name": "A", "price": 12, "primary_image": {"url": "a.jpg"}, "quantity": 2},
            {"id": 2, "name": "B", "price": "x", "quantity": 0},
            {"id": 3, "name": "C", "price": "1.5", "quantity": -4},
            {"id": 1, "name": "A", "price": 12, "quantity": 1}
        ]"#;
        let cart = decode(raw).unwrap();
        assert_eq!(cart.lines().len(), 1);
        let line = &cart.lines()[0];
        assert_eq!(line.quantity, 3);
        assert_eq!(line.primary_image.as_deref(), Some("a.jpg"));
        assert_eq!(line.price, Price::from_cents(1200));
    }
}
