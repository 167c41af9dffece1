//! Request and response bodies of the MartAfrica REST API.

use std::fmt;

use martafrica_core::{OrderId, Price, ProductId, UserId};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A collection response.
///
/// Paginated endpoints wrap items in `results`; others return a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Bare(Vec<T>),
    Page {
        #[serde(default = "Vec::new")]
        results: Vec<T>,
    },
}

impl<T> Listing<T> {
    /// The items regardless of envelope.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Self::Bare(items) | Self::Page { results: items } => items,
        }
    }
}

/// Bearer access token issued by the MartAfrica API.
///
/// Serializes as the raw token so it can live in the session; `Debug` never
/// prints it.
#[derive(Clone)]
pub struct AccessToken(SecretString);

impl AccessToken {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token for the `Authorization` header.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

impl Serialize for AccessToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl<'de> Deserialize<'de> for AccessToken {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::new)
    }
}

/// Body of `POST /login/`.
#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct TokenPair {
    #[serde(default)]
    pub access: Option<AccessToken>,
    #[serde(default)]
    pub refresh: Option<AccessToken>,
}

/// Response of `POST /login/`.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub tokens: Option<TokenPair>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// A successful login.
#[derive(Debug, Clone)]
pub struct Login {
    pub access: AccessToken,
    pub user: Option<UserProfile>,
}

/// Body of `POST /register/`.
#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /admin/register/`.
#[derive(Debug, Serialize)]
pub struct AdminRegisterRequest<'a> {
    pub email: &'a str,
    pub fullname: &'a str,
    pub password: &'a str,
    pub password_confirm: &'a str,
    pub is_admin: bool,
}

/// A user as returned by `/profile/` and `/users/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub id: Option<UserId>,
    pub email: String,
    #[serde(default, alias = "full_name")]
    pub fullname: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub is_staff: Option<bool>,
}

impl UserProfile {
    /// Name to greet the user with, falling back to the email address.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.fullname
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.email)
    }

    /// Date part of `created_at` (the API sends RFC 3339 timestamps).
    #[must_use]
    pub fn joined_on(&self) -> Option<&str> {
        self.created_at
            .as_deref()
            .and_then(|ts| ts.split('T').next())
            .filter(|date| !date.is_empty())
    }
}

/// One product and quantity in an order submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderItem {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Body of `POST /orders/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub shipping_address: String,
    pub city: String,
    pub postal_code: String,
    pub order_items: Vec<OrderItem>,
}

/// Response of `POST /orders/`; only the fields the confirmation page shows.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacedOrder {
    #[serde(default)]
    pub id: Option<OrderId>,
    #[serde(default)]
    pub total_price: Option<Price>,
}

/// Body of `POST /wishlist/`.
#[derive(Debug, Serialize)]
pub struct WishlistAddRequest {
    pub product_id: ProductId,
}

/// Error body; the API uses `detail`, `error` or `message` depending on the view.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// The first non-empty message field.
    #[must_use]
    pub fn into_message(self) -> Option<String> {
        [self.detail, self.error, self.message]
            .into_iter()
            .flatten()
            .find(|m| !m.trim().is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_accepts_both_shapes() {
        let page: Listing<i64> = serde_json::from_str(r#"{"results": [1, 2], "count": 2}"#).unwrap();
        let bare: Listing<i64> = serde_json::from_str("[3]").unwrap();
        let empty: Listing<i64> = serde_json::from_str("{}").unwrap();
        assert_eq!(page.into_vec(), vec![1, 2]);
        assert_eq!(bare.into_vec(), vec![3]);
        assert!(empty.into_vec().is_empty());
    }

    #[test]
    fn test_access_token_debug_is_redacted() {
        let token = AccessToken::new("eyJhbGciOi.secret");
        assert_eq!(format!("{token:?}"), "AccessToken([REDACTED])");
        assert_eq!(serde_json::to_string(&token).unwrap(), "\"eyJhbGciOi.secret\"");
    }

    #[test]
    fn test_login_response_with_tokens() {
        let json = r#"{"tokens": {"access": "abc", "refresh": "def"}, "user": {"email": "a@b.c", "fullname": "Ada"}}"#;
        let response: LoginResponse = serde_json::from_str(json).unwrap();
        let access = response.tokens.and_then(|t| t.access).unwrap();
        assert_eq!(access.expose(), "abc");
        assert_eq!(response.user.unwrap().display_name(), "Ada");
    }

    #[test]
    fn test_user_profile_joined_on() {
        let json = r#"{"email": "a@b.c", "full_name": " ", "created_at": "2024-05-01T10:00:00Z"}"#;
        let user: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(user.joined_on(), Some("2024-05-01"));
        assert_eq!(user.display_name(), "a@b.c");
    }

    #[test]
    fn test_error_body_message_precedence() {
        let body: ErrorBody = serde_json::from_str(r#"{"error": "Already in wishlist"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Already in wishlist"));

        let body: ErrorBody = serde_json::from_str(r#"{"detail": " ", "message": "Nope"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Nope"));
    }

    #[test]
    fn test_order_request_shape() {
        let order = OrderRequest {
            shipping_address: "12 Market St".to_string(),
            city: "Lagos".to_string(),
            postal_code: "100001".to_string(),
            order_items: vec![OrderItem {
                product_id: ProductId::new(1),
                quantity: 2,
            }],
        };
        assert_eq!(
            serde_json::to_value(&order).unwrap(),
            serde_json::json!({
                "shipping_address": "12 Market St",
                "city": "Lagos",
                "postal_code": "100001",
                "order_items": [{"product_id": 1, "quantity": 2}]
            })
        );
    }
}
