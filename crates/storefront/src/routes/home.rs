//! Home page: the product catalog.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use martafrica_core::Product;
use tracing::instrument;

use crate::filters;
use crate::middleware::PageContext;
use crate::state::AppState;

/// Product card display data for listing templates.
#[derive(Clone)]
pub struct ProductCard {
    pub id: i64,
    pub name: String,
    pub brand: Option<String>,
    pub price: String,
    /// Raw price as sent back by add-to-cart forms.
    pub price_value: String,
    pub image: Option<String>,
    pub description: String,
    pub in_stock: bool,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            price: product.price.display(),
            price_value: product.price.amount().to_string(),
            image: product.primary_image_src().map(str::to_owned),
            description: product.description.clone().unwrap_or_default(),
            in_stock: product.in_stock(),
        }
    }
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub page: PageContext,
    pub products: Vec<ProductCard>,
    pub error: Option<String>,
}

/// Display the product catalog.
///
/// An unreachable API renders an empty catalog with an inline message.
#[instrument(skip(state, page))]
pub async fn home(State(state): State<AppState>, page: PageContext) -> impl IntoResponse {
    match state.api().list_products().await {
        Ok(products) => HomeTemplate {
            page,
            products: products.iter().map(ProductCard::from).collect(),
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load products");
            HomeTemplate {
                page,
                products: Vec::new(),
                error: Some("Failed to load products. Please try again later.".to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::json;

    use crate::testing::{TestClient, spawn_api, test_state};

    #[tokio::test]
    async fn test_home_lists_products() {
        let api = Router::new().route(
            "/api/products/",
            get(|| async {
                Json(json!({"results": [
                    {"id": 1, "name": "Kente scarf", "price": "25", "is_in_stock": true},
                    {"id": 2, "name": "Talking drum", "price": "90", "qty_left": 0}
                ]}))
            }),
        );
        let mut client = TestClient::new(test_state(&spawn_api(api).await));

        let page = client.get("/").await;
        assert!(page.body.contains("Kente scarf"));
        assert!(page.body.contains("name=\"price\" value=\"25\""));
        assert!(page.body.contains("Out of stock"));
    }

    #[tokio::test]
    async fn test_home_survives_api_outage() {
        let mut client = TestClient::new(test_state("http://127.0.0.1:9/api"));
        let page = client.get("/").await;
        assert!(page.body.contains("Failed to load products. Please try again later."));
    }
}
