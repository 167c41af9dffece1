//! Product detail page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use martafrica_core::{Product, ProductId};
use tracing::instrument;

use crate::api::ApiError;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::PageContext;
use crate::routes::home::ProductCard;
use crate::state::AppState;

/// Image display data for templates.
#[derive(Clone)]
pub struct ImageView {
    pub url: String,
    pub alt: String,
}

/// Product detail display data beyond the card fields.
#[derive(Clone)]
pub struct ProductDetail {
    pub description: String,
    pub category: Option<String>,
    pub seller: Option<String>,
    pub rating: Option<String>,
    pub stock: Option<i64>,
    pub gallery: Vec<ImageView>,
}

impl From<&Product> for ProductDetail {
    fn from(product: &Product) -> Self {
        let gallery = product
            .images
            .iter()
            .filter_map(|image| {
                image.src().map(|url| ImageView {
                    url: url.to_string(),
                    alt: image.alt_text().unwrap_or(&product.name).to_string(),
                })
            })
            .collect();

        Self {
            description: product.description.clone().unwrap_or_default(),
            category: product.category_label().map(str::to_owned),
            seller: product.seller_name.clone(),
            rating: product.average_rating.map(|r| format!("{r:.1}")),
            stock: product.stock,
            gallery,
        }
    }
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub page: PageContext,
    pub product: ProductCard,
    pub detail: ProductDetail,
}

/// Display a product.
///
/// # Errors
///
/// Returns 404 for unknown products and 502 when the API is unavailable.
#[instrument(skip(state, page))]
pub async fn show(
    State(state): State<AppState>,
    page: PageContext,
    Path(id): Path<ProductId>,
) -> Result<impl IntoResponse> {
    let product = state.api().get_product(id).await.map_err(|e| match e {
        ApiError::NotFound(_) => AppError::NotFound(format!("product {id}")),
        other => AppError::Api(other),
    })?;

    Ok(ProductShowTemplate {
        page,
        product: ProductCard::from(&product),
        detail: ProductDetail::from(&product),
    })
}
