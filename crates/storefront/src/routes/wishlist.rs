//! Wishlist route handlers.
//!
//! Removal is optimistic: the entry leaves the local list before the API is
//! asked to delete it, and a failed delete rolls the list back to its exact
//! prior state. Remove and move render the resulting list directly.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use martafrica_core::{ProductId, ProductSnapshot, Wishlist, WishlistEntry, WishlistEntryId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::{AccessToken, ApiError, MartApiClient};
use crate::cart::SessionCart;
use crate::filters;
use crate::middleware::{PageContext, RequireCustomer, set_flash};
use crate::models::Flash;
use crate::routes::home::ProductCard;
use crate::routes::session_expired;
use crate::state::AppState;

const REMOVE_FAILED: &str = "Failed to remove item. Please try again.";
const NOT_IN_WISHLIST: &str = "That item is no longer in your wishlist.";

/// Wishlist entry display data.
#[derive(Clone)]
pub struct WishlistItemView {
    pub id: i64,
    pub product: ProductCard,
}

impl From<&WishlistEntry> for WishlistItemView {
    fn from(entry: &WishlistEntry) -> Self {
        Self {
            id: entry.id.as_i64(),
            product: ProductCard::from(&entry.product),
        }
    }
}

/// Wishlist page template.
#[derive(Template, WebTemplate)]
#[template(path = "wishlist/show.html")]
pub struct WishlistTemplate {
    pub page: PageContext,
    pub items: Vec<WishlistItemView>,
    pub error: Option<String>,
}

impl WishlistTemplate {
    fn new(page: PageContext, wishlist: &Wishlist) -> Self {
        Self {
            page,
            items: wishlist.entries().iter().map(WishlistItemView::from).collect(),
            error: None,
        }
    }
}

/// Add to wishlist form data.
#[derive(Debug, Deserialize)]
pub struct AddToWishlistForm {
    pub product_id: ProductId,
}

/// Why an entry could not be removed.
#[derive(Debug)]
pub enum RemoveFailure {
    /// The entry is not in the local list.
    Missing,
    /// The API refused or could not be reached; the list was rolled back.
    Api(ApiError),
}

/// Remove `id` from `wishlist` optimistically.
///
/// On success the entry is returned and stays removed. On API failure the
/// list is restored to its prior contents and order.
///
/// # Errors
///
/// Returns [`RemoveFailure`] if the entry is unknown or the API call fails.
pub async fn remove_optimistically(
    api: &MartApiClient,
    token: &AccessToken,
    wishlist: &mut Wishlist,
    id: WishlistEntryId,
) -> Result<WishlistEntry, RemoveFailure> {
    let pending = wishlist.begin_remove(id).ok_or(RemoveFailure::Missing)?;

    match api.remove_from_wishlist(token, id).await {
        Ok(()) => Ok(pending.commit()),
        Err(e) => {
            tracing::warn!(error = %e, wishlist_entry_id = %id, "Rolling back wishlist removal");
            pending.rollback(wishlist);
            Err(RemoveFailure::Api(e))
        }
    }
}

/// Load the wishlist, or the response to send instead.
async fn load_wishlist(
    state: &AppState,
    token: &AccessToken,
    page: PageContext,
    session: &Session,
) -> Result<(Wishlist, PageContext), Response> {
    match state.api().wishlist(token).await {
        Ok(wishlist) => Ok((wishlist, page)),
        Err(ApiError::Unauthorized) => Err(session_expired(session).await),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch wishlist");
            Err(WishlistTemplate {
                page,
                items: Vec::new(),
                error: Some(
                    e.user_message("An error occurred while fetching your wishlist."),
                ),
            }
            .into_response())
        }
    }
}

/// Display the wishlist.
#[instrument(skip_all)]
pub async fn show(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    page: PageContext,
    session: Session,
) -> Response {
    match load_wishlist(&state, &customer.token, page, &session).await {
        Ok((wishlist, page)) => WishlistTemplate::new(page, &wishlist).into_response(),
        Err(response) => response,
    }
}

/// Save a product, then return to its page with the outcome.
#[instrument(skip_all, fields(product_id = %form.product_id))]
pub async fn add(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    session: Session,
    Form(form): Form<AddToWishlistForm>,
) -> Response {
    let flash = match state
        .api()
        .add_to_wishlist(&customer.token, form.product_id)
        .await
    {
        Ok(()) => Flash::success("Added to your wishlist."),
        Err(ApiError::Unauthorized) => return session_expired(&session).await,
        Err(e) => Flash::error(e.user_message("Failed to add to wishlist.")),
    };

    set_flash(&session, flash).await;
    Redirect::to(&format!("/products/{}", form.product_id)).into_response()
}

/// Remove an entry.
#[instrument(skip_all, fields(wishlist_entry_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    page: PageContext,
    session: Session,
    Path(id): Path<WishlistEntryId>,
) -> Response {
    let (mut wishlist, page) = match load_wishlist(&state, &customer.token, page, &session).await {
        Ok(loaded) => loaded,
        Err(response) => return response,
    };

    let flash = match remove_optimistically(state.api(), &customer.token, &mut wishlist, id).await
    {
        Ok(entry) => Flash::success(format!("Removed {} from your wishlist.", entry.product.name)),
        Err(RemoveFailure::Api(ApiError::Unauthorized)) => return session_expired(&session).await,
        Err(RemoveFailure::Api(_)) => Flash::error(REMOVE_FAILED),
        Err(RemoveFailure::Missing) => Flash::error(NOT_IN_WISHLIST),
    };

    WishlistTemplate::new(page.with_flash(flash), &wishlist).into_response()
}

/// Add an entry's product to the cart, then remove it from the wishlist.
///
/// The cart keeps the product even if the wishlist removal fails.
#[instrument(skip_all, fields(wishlist_entry_id = %id))]
pub async fn move_to_cart(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    page: PageContext,
    session: Session,
    Path(id): Path<WishlistEntryId>,
) -> Response {
    let (mut wishlist, page) = match load_wishlist(&state, &customer.token, page, &session).await {
        Ok(loaded) => loaded,
        Err(response) => return response,
    };

    let Some(entry) = wishlist.get(id) else {
        return WishlistTemplate::new(page.with_flash(Flash::error(NOT_IN_WISHLIST)), &wishlist)
            .into_response();
    };
    let product = ProductSnapshot::from(&entry.product);
    let name = product.name.clone();

    let mut cart = SessionCart::load(session.clone()).await;
    cart.store().add_item(product);
    let page = page.with_cart_count(cart.commit().await.total_items());

    let flash = match remove_optimistically(state.api(), &customer.token, &mut wishlist, id).await
    {
        Ok(_) => Flash::success(format!("Moved {name} to your cart.")),
        Err(RemoveFailure::Api(ApiError::Unauthorized)) => return session_expired(&session).await,
        Err(_) => Flash::error(format!(
            "Moved {name} to your cart, but it could not be removed from your wishlist."
        )),
    };

    WishlistTemplate::new(page.with_flash(flash), &wishlist).into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::extract::Path;
    use axum::http::StatusCode;
    use axum::routing::{delete, get};
    use axum::{Json, Router};
    use serde_json::json;

    use super::*;
    use crate::testing::{TestClient, login_api, spawn_api, test_state};

    fn wishlist_api(delete_status: StatusCode) -> Router {
        login_api()
            .route(
                "/api/wishlist/",
                get(|| async {
                    Json(json!([
                        {"id": 5, "product": {"id": 1, "name": "Kente scarf", "price": "25.00"}},
                        {"id": 6, "product": {"id": 2, "name": "Shea butter", "price": "8.00"}}
                    ]))
                }),
            )
            .route(
                "/api/wishlist/{id}/",
                delete(move |Path(_id): Path<i64>| async move { delete_status }),
            )
    }

    async fn signed_in(delete_status: StatusCode) -> TestClient {
        let url = spawn_api(wishlist_api(delete_status)).await;
        let mut client = TestClient::new(test_state(&url));
        client.log_in().await;
        client
    }

    #[tokio::test]
    async fn test_wishlist_requires_login() {
        let mut client = TestClient::new(test_state("http://127.0.0.1:9/api"));
        assert_eq!(client.get("/wishlist").await.location(), Some("/auth/login"));
    }

    #[tokio::test]
    async fn test_show_lists_entries() {
        let mut client = signed_in(StatusCode::NO_CONTENT).await;
        let page = client.get("/wishlist").await;
        assert_eq!(page.status, StatusCode::OK);
        assert!(page.body.contains("Kente scarf"));
        assert!(page.body.contains("/wishlist/6/move"));
    }

    #[tokio::test]
    async fn test_remove_drops_entry() {
        let mut client = signed_in(StatusCode::NO_CONTENT).await;
        let page = client.post_form("/wishlist/5/remove", "").await;
        assert!(page.body.contains("Removed Kente scarf from your wishlist."));
        assert!(!page.body.contains("/wishlist/5/remove"));
        assert!(page.body.contains("Shea butter"));
    }

    #[tokio::test]
    async fn test_failed_remove_rolls_back() {
        let mut client = signed_in(StatusCode::INTERNAL_SERVER_ERROR).await;
        let page = client.post_form("/wishlist/5/remove", "").await;
        assert!(page.body.contains(REMOVE_FAILED));

        let scarf = page.body.find("/wishlist/5/remove").unwrap();
        let butter = page.body.find("/wishlist/6/remove").unwrap();
        assert!(scarf < butter);
    }

    #[tokio::test]
    async fn test_remove_unknown_entry() {
        let mut client = signed_in(StatusCode::NO_CONTENT).await;
        let page = client.post_form("/wishlist/99/remove", "").await;
        assert!(page.body.contains(NOT_IN_WISHLIST));
    }

    #[tokio::test]
    async fn test_move_to_cart() {
        let mut client = signed_in(StatusCode::NO_CONTENT).await;
        let page = client.post_form("/wishlist/6/move", "").await;
        assert!(page.body.contains("Moved Shea butter to your cart."));
        assert!(!page.body.contains("/wishlist/6/move"));

        let cart = client.get("/cart").await;
        assert!(cart.body.contains("Shea butter"));
        assert!(cart.body.contains("$8.00"));
    }

    #[tokio::test]
    async fn test_move_keeps_cart_line_when_remove_fails() {
        let mut client = signed_in(StatusCode::BAD_GATEWAY).await;
        let page = client.post_form("/wishlist/6/move", "").await;
        assert!(page.body.contains("could not be removed from your wishlist"));
        assert!(page.body.contains("/wishlist/6/move"));
        assert_eq!(client.get("/cart/count").await.body.trim(), "1");
    }
}
