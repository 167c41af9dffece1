//! MartAfrica REST API client.
//!
//! # Architecture
//!
//! - The remote API is the source of truth for products, users, orders and
//!   wishlists. Nothing is mirrored locally except the cart, which the API
//!   does not know about.
//! - JSON over HTTPS via `reqwest`; authenticated calls send
//!   `Authorization: Bearer <access token>` for customers and admins alike.
//! - Product listings and details are cached in memory via `moka`.
//!
//! # Example
//!
//! ```rust,ignore
//! use martafrica_storefront::api::MartApiClient;
//!
//! let client = MartApiClient::new(&config.api)?;
//! let products = client.list_products().await?;
//! let login = client.login("ada@example.com", "hunter2").await?;
//! let wishlist = client.wishlist(&login.access).await?;
//! client.logout(&login.access).await?;
//! ```

mod account;
mod cache;
mod orders;
mod products;
pub mod types;
mod wishlist;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;
use cache::{CacheKey, CacheValue};
pub use types::AccessToken;
use types::ErrorBody;

/// Errors that can occur when calling the MartAfrica API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed (connection, timeout, TLS).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("API returned {status}: {message}")]
    Status { status: u16, message: String },

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The token was rejected or is missing.
    #[error("Unauthorized")]
    Unauthorized,

    /// Login succeeded but the response carried no access token.
    #[error("Token not received")]
    MissingToken,

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// An endpoint path could not be joined to the base URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// A message safe to show inline on the page that made the call.
    ///
    /// API-provided messages (e.g. "Already in wishlist") are passed through;
    /// transport failures get a generic message.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Status { message, .. } if !message.is_empty() => message.clone(),
            Self::NotFound(_) => "Not found.".to_string(),
            Self::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            Self::MissingToken => "Token not received".to_string(),
            _ => fallback.to_string(),
        }
    }
}

/// Client for the MartAfrica REST API.
///
/// Cheap to clone; all clones share one connection pool and cache.
#[derive(Clone)]
pub struct MartApiClient {
    inner: Arc<MartApiClientInner>,
}

struct MartApiClientInner {
    client: reqwest::Client,
    base_url: Url,
    cache: Cache<CacheKey, CacheValue>,
}

impl MartApiClient {
    /// Create a new API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built (TLS backend).
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("martafrica-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(config.cache_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(MartApiClientInner {
                client,
                base_url: config.base_url.clone(),
                cache,
            }),
        })
    }

    /// The API base URL (always ends in `/`).
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// Drop all cached products.
    pub fn invalidate_cache(&self) {
        self.inner.cache.invalidate_all();
    }

    /// Build a request for a path relative to the base URL.
    fn request(
        &self,
        method: Method,
        path: &str,
        token: Option<&AccessToken>,
    ) -> Result<RequestBuilder, ApiError> {
        let url = self.inner.base_url.join(path)?;
        let builder = self
            .inner
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");
        Ok(match token {
            Some(token) => builder.bearer_auth(token.expose()),
            None => builder,
        })
    }

    /// `GET` a JSON document.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&AccessToken>,
    ) -> Result<T, ApiError> {
        let response = self.request(Method::GET, path, token)?.send().await?;
        read_json(response).await
    }

    /// Send a JSON body and decode the JSON reply.
    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        token: Option<&AccessToken>,
        body: &B,
    ) -> Result<T, ApiError> {
        let response = self
            .request(method, path, token)?
            .json(body)
            .send()
            .await?;
        read_json(response).await
    }

    /// Send a JSON body where only the status matters; the reply body is
    /// ignored on success.
    async fn send_expect_success<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        token: Option<&AccessToken>,
        body: &B,
    ) -> Result<(), ApiError> {
        let response = self
            .request(method, path, token)?
            .json(body)
            .send()
            .await?;
        expect_success(response).await
    }

    /// `POST` without a body where only the status matters.
    async fn post_empty(&self, path: &str, token: Option<&AccessToken>) -> Result<(), ApiError> {
        let response = self.request(Method::POST, path, token)?.send().await?;
        expect_success(response).await
    }
}

/// Accept any success status, or map the failure to an [`ApiError`].
async fn expect_success(response: reqwest::Response) -> Result<(), ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    let url = response.url().clone();
    let text = response.text().await?;
    Err(status_error(status, &url, &text))
}

/// Decode a successful JSON response, or map the failure to an [`ApiError`].
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
    let status = response.status();
    let url = response.url().clone();
    let body = response.text().await?;

    if !status.is_success() {
        return Err(status_error(status, &url, &body));
    }

    serde_json::from_str(&body).map_err(|e| {
        tracing::error!(
            error = %e,
            url = %url,
            body = %body.chars().take(500).collect::<String>(),
            "Failed to parse MartAfrica API response"
        );
        ApiError::Parse(e)
    })
}

/// Map a non-success response to an error, keeping the API's own message.
fn status_error(status: StatusCode, url: &Url, body: &str) -> ApiError {
    match status {
        StatusCode::NOT_FOUND => ApiError::NotFound(url.path().to_string()),
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        _ => {
            let message = serde_json::from_str::<ErrorBody>(body)
                .ok()
                .and_then(ErrorBody::into_message)
                .unwrap_or_default();
            tracing::warn!(
                status = %status,
                url = %url,
                body = %body.chars().take(200).collect::<String>(),
                "MartAfrica API returned non-success status"
            );
            ApiError::Status {
                status: status.as_u16(),
                message,
            }
        }
    }
}
