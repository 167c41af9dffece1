//! Product, search and category endpoints.

use std::sync::Arc;

use martafrica_core::{Category, Product, ProductId};
use tracing::{debug, instrument};

use super::cache::{CacheKey, CacheValue};
use super::types::{AccessToken, Listing};
use super::{ApiError, MartApiClient};

impl MartApiClient {
    /// List all products (`GET /products/`), cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> Result<Arc<Vec<Product>>, ApiError> {
        let key = CacheKey::Products;
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product listing");
            return Ok(products);
        }

        let listing: Listing<Product> = self.get_json("products/", None).await?;
        let products = Arc::new(listing.into_vec());
        self.inner
            .cache
            .insert(key, CacheValue::Products(Arc::clone(&products)))
            .await;
        Ok(products)
    }

    /// Fetch one product (`GET /products/{id}/`), cached.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for unknown ids, or any transport error.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: ProductId) -> Result<Product, ApiError> {
        let key = CacheKey::Product(id);
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let product: Product = self.get_json(&format!("products/{id}/"), None).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Full-text product search (`GET /search/?q=`). Not cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the body is not a product list.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<Product>, ApiError> {
        let response = self
            .request(reqwest::Method::GET, "search/", None)?
            .query(&[("q", query)])
            .send()
            .await?;
        let listing: Listing<Product> = super::read_json(response).await?;
        Ok(listing.into_vec())
    }

    /// List categories (`GET /categories/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is rejected.
    #[instrument(skip(self, token))]
    pub async fn list_categories(
        &self,
        token: Option<&AccessToken>,
    ) -> Result<Vec<Category>, ApiError> {
        let listing: Listing<Category> = self.get_json("categories/", token).await?;
        Ok(listing.into_vec())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::testing::{api_client, spawn_api};

    #[tokio::test]
    async fn test_list_products_is_cached() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let api = Router::new().route(
            "/api/products/",
            get(|| async {
                CALLS.fetch_add(1, Ordering::SeqCst);
                Json(json!({"count": 1, "results": [{"id": 1, "name": "Kente scarf", "price": "25.00"}]}))
            }),
        );
        let client = api_client(&spawn_api(api).await);

        let first = client.list_products().await.unwrap();
        let second = client.list_products().await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(second[0].name, "Kente scarf");
        assert_eq!(CALLS.load(Ordering::SeqCst), 1);

        client.invalidate_cache();
        client.list_products().await.unwrap();
        assert_eq!(CALLS.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_get_product_not_found() {
        let api = Router::new().route(
            "/api/products/{id}/",
            get(|| async { (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))) }),
        );
        let client = api_client(&spawn_api(api).await);

        let err = client.get_product(ProductId::new(99)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_search_sends_query_and_accepts_bare_array() {
        #[derive(serde::Deserialize)]
        struct Q {
            q: String,
        }
        let api = Router::new().route(
            "/api/search/",
            get(|Query(q): Query<Q>| async move {
                Json(json!([{"id": 7, "name": format!("{} basket", q.q), "price": 12.5}]))
            }),
        );
        let client = api_client(&spawn_api(api).await);

        let results = client.search_products("woven").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "woven basket");
        assert_eq!(results[0].price.display(), "$12.50");
    }

    #[tokio::test]
    async fn test_malformed_body_is_a_parse_error() {
        let api = Router::new().route("/api/products/", get(|| async { "<html>oops</html>" }));
        let client = api_client(&spawn_api(api).await);

        let err = client.list_products().await.unwrap_err();
        assert!(matches!(err, ApiError::Parse(_)));
    }
}
