//! Order submission.

use tracing::instrument;

use super::types::{AccessToken, OrderRequest, PlacedOrder};
use super::{ApiError, MartApiClient};

impl MartApiClient {
    /// Submit an order (`POST /orders/`).
    ///
    /// The caller clears the cart only after this returns `Ok`. A placed order
    /// changes stock, so cached products are dropped.
    ///
    /// # Errors
    ///
    /// Returns the API's `detail` message on rejection (e.g. stock), or a
    /// transport error.
    #[instrument(skip(self, token, order), fields(lines = order.order_items.len()))]
    pub async fn place_order(
        &self,
        token: &AccessToken,
        order: &OrderRequest,
    ) -> Result<PlacedOrder, ApiError> {
        let placed = self
            .send_json(reqwest::Method::POST, "orders/", Some(token), order)
            .await?;
        self.invalidate_cache();
        Ok(placed)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::http::StatusCode;
    use axum::routing::{get, post};
    use axum::{Json, Router};
    use martafrica_core::{Price, ProductId};
    use serde_json::{Value, json};

    use super::*;
    use crate::api::types::OrderItem;
    use crate::testing::{api_client, spawn_api};

    fn order() -> OrderRequest {
        OrderRequest {
            shipping_address: "12 Market St".to_string(),
            city: "Accra".to_string(),
            postal_code: "00233".to_string(),
            order_items: vec![OrderItem {
                product_id: ProductId::new(1),
                quantity: 2,
            }],
        }
    }

    #[tokio::test]
    async fn test_place_order_returns_confirmation() {
        let api = Router::new().route(
            "/api/orders/",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["order_items"][0]["quantity"], 2);
                (StatusCode::CREATED, Json(json!({"id": 42, "total_price": "50.00"})))
            }),
        );
        let client = api_client(&spawn_api(api).await);

        let placed = client
            .place_order(&AccessToken::new("t"), &order())
            .await
            .unwrap();
        assert_eq!(placed.id.map(|id| id.as_i64()), Some(42));
        assert_eq!(placed.total_price, Some(Price::from_cents(5000)));
    }

    #[tokio::test]
    async fn test_place_order_rejection_keeps_detail() {
        let api = Router::new().route(
            "/api/orders/",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"detail": "Not enough stock for Kente scarf"})),
                )
            }),
        );
        let client = api_client(&spawn_api(api).await);

        let err = client
            .place_order(&AccessToken::new("t"), &order())
            .await
            .unwrap_err();
        assert_eq!(err.user_message("x"), "Not enough stock for Kente scarf");
    }

    #[tokio::test]
    async fn test_placed_order_refreshes_stock() {
        static CALLS: AtomicUsize = AtomicUsize::new(0);
        let api = Router::new()
            .route(
                "/api/products/{id}/",
                get(|| async {
                    let left = 5 - CALLS.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"id": 1, "name": "Kente scarf", "price": "25.00", "qty_left": left}))
                }),
            )
            .route(
                "/api/orders/",
                post(|| async { (StatusCode::CREATED, Json(json!({"id": 7}))) }),
            );
        let client = api_client(&spawn_api(api).await);
        let id = ProductId::new(1);

        assert_eq!(client.get_product(id).await.unwrap().stock, Some(5));
        assert_eq!(client.get_product(id).await.unwrap().stock, Some(5));

        client
            .place_order(&AccessToken::new("t"), &order())
            .await
            .unwrap();
        assert_eq!(client.get_product(id).await.unwrap().stock, Some(4));
        assert_eq!(CALLS.load(Ordering::SeqCst), 2);
    }
}
