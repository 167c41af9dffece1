//! Product search.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use crate::filters;
use crate::middleware::PageContext;
use crate::routes::home::ProductCard;
use crate::state::AppState;

/// Search query parameters.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

/// Search results template.
#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub page: PageContext,
    pub query: String,
    pub products: Vec<ProductCard>,
    pub error: Option<String>,
}

/// Display search results. A blank query shows the empty search page
/// without calling the API.
#[instrument(skip(state, page))]
pub async fn search(
    State(state): State<AppState>,
    page: PageContext,
    Query(query): Query<SearchQuery>,
) -> impl IntoResponse {
    let q = query.q.trim().to_string();
    if q.is_empty() {
        return SearchTemplate {
            page,
            query: q,
            products: Vec::new(),
            error: None,
        };
    }

    match state.api().search_products(&q).await {
        Ok(products) => SearchTemplate {
            page,
            query: q,
            products: products.iter().map(ProductCard::from).collect(),
            error: None,
        },
        Err(e) => {
            tracing::warn!(error = %e, "Search failed");
            SearchTemplate {
                page,
                query: q,
                products: Vec::new(),
                error: Some("Search failed. Please try again.".to_string()),
            }
        }
    }
}
