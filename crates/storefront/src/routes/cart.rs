//! Cart route handlers.
//!
//! Every handler restores the visitor's cart from the session, applies one
//! Cart Store operation, and commits. Plain form posts redirect back to the
//! cart page; htmx requests get the updated fragment and a `cart-updated`
//! trigger so the header badge refreshes.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use martafrica_core::{Cart, CartLine, Price, ProductId, ProductSnapshot};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::cart::SessionCart;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{PageContext, set_flash};
use crate::models::Flash;
use crate::routes::is_htmx;

/// htmx event fired whenever the cart changes.
const CART_UPDATED_TRIGGER: (&str, &str) = ("HX-Trigger", "cart-updated");

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: i64,
    pub name: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_price: String,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.as_i64(),
            name: line.name.clone(),
            image: line.primary_image.clone(),
            quantity: line.quantity,
            price: line.price.display(),
            line_price: line.line_total().display(),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub item_count: u64,
}

impl CartView {
    /// Item count with its noun, e.g. "1 item" or "3 items".
    #[must_use]
    pub fn count_label(&self) -> String {
        match self.item_count {
            1 => "1 item".to_string(),
            n => format!("{n} items"),
        }
    }
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.lines().iter().map(CartItemView::from).collect(),
            subtotal: cart.total_price().display(),
            item_count: cart.total_items(),
        }
    }
}

/// Add to cart form data.
///
/// Carries the product fields the cart line keeps, so adding never needs a
/// round trip to the API.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub primary_image: Option<String>,
}

impl From<AddToCartForm> for ProductSnapshot {
    fn from(form: AddToCartForm) -> Self {
        Self {
            id: form.id,
            name: form.name,
            price: Price::parse_lenient(&form.price),
            primary_image: form.primary_image.filter(|src| !src.trim().is_empty()),
        }
    }
}

/// Update quantity form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: ProductId,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: ProductId,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub cart: CartView,
}

/// Cart items fragment template (for htmx).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_items.html")]
pub struct CartItemsTemplate {
    pub cart: CartView,
}

/// Cart count badge fragment template (for htmx).
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Respond to a cart mutation: the items fragment for htmx, otherwise a
/// redirect back to the cart page.
fn cart_changed(headers: &HeaderMap, cart: &Cart) -> Response {
    if is_htmx(headers) {
        (
            AppendHeaders([CART_UPDATED_TRIGGER]),
            CartItemsTemplate {
                cart: CartView::from(cart),
            },
        )
            .into_response()
    } else {
        Redirect::to("/cart").into_response()
    }
}

/// Display cart page.
#[instrument(skip(page, session))]
pub async fn show(page: PageContext, session: Session) -> impl IntoResponse {
    let cart = SessionCart::load(session).await;
    CartShowTemplate {
        page,
        cart: CartView::from(cart.cart()),
    }
}

/// Add a product to the cart, or bump its quantity if already there.
#[instrument(skip(headers, session))]
pub async fn add(headers: HeaderMap, session: Session, Form(form): Form<AddToCartForm>) -> Response {
    let product = ProductSnapshot::from(form);
    add_breadcrumb(
        "cart",
        "Added to cart",
        Some(&[("product_id", &product.id.to_string())]),
    );

    let name = product.name.clone();
    let mut cart = SessionCart::load(session.clone()).await;
    cart.store().add_item(product);
    let cart = cart.commit().await;

    if is_htmx(&headers) {
        return (
            AppendHeaders([CART_UPDATED_TRIGGER]),
            CartCountTemplate {
                count: cart.total_items(),
            },
        )
            .into_response();
    }

    set_flash(&session, Flash::success(format!("Added {name} to your cart."))).await;
    Redirect::to("/cart").into_response()
}

/// Set a line's quantity. Zero or less removes the line.
#[instrument(skip(headers, session))]
pub async fn update(
    headers: HeaderMap,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Response {
    let mut cart = SessionCart::load(session).await;
    cart.store().update_quantity(form.id, form.quantity);
    let cart = cart.commit().await;
    cart_changed(&headers, &cart)
}

/// Remove a line from the cart.
#[instrument(skip(headers, session))]
pub async fn remove(
    headers: HeaderMap,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Response {
    let mut cart = SessionCart::load(session).await;
    cart.store().remove_item(form.id);
    let cart = cart.commit().await;
    cart_changed(&headers, &cart)
}

/// Empty the cart.
#[instrument(skip(headers, session))]
pub async fn clear(headers: HeaderMap, session: Session) -> Response {
    let mut cart = SessionCart::load(session).await;
    cart.store().clear_cart();
    let cart = cart.commit().await;
    cart_changed(&headers, &cart)
}

/// Get cart count badge (htmx).
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let cart = SessionCart::load(session).await;
    CartCountTemplate {
        count: cart.cart().total_items(),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::testing::{TestClient, test_state};

    const BASKET: &str = "id=1&name=Woven+Basket&price=25.00&primary_image=";
    const MUG: &str = "id=2&name=Clay+Mug&price=4.50&primary_image=https%3A%2F%2Fimg.test%2Fmug.jpg";

    fn client() -> TestClient {
        TestClient::new(test_state("http://127.0.0.1:9/api"))
    }

    #[tokio::test]
    async fn test_add_redirects_and_flashes() {
        let mut client = client();

        let response = client.post_form("/cart/add", BASKET).await;
        assert_eq!(response.status, StatusCode::SEE_OTHER);
        assert_eq!(response.location(), Some("/cart"));

        let page = client.get("/cart").await;
        assert_eq!(page.status, StatusCode::OK);
        assert!(page.body.contains("Added Woven Basket to your cart."));
        assert!(page.body.contains("Woven Basket"));
        assert!(page.body.contains("$25.00"));

        // Flash shows once
        let again = client.get("/cart").await;
        assert!(!again.body.contains("Added Woven Basket"));
    }

    #[tokio::test]
    async fn test_htmx_add_returns_count_and_trigger() {
        let mut client = client();

        client.post_htmx("/cart/add", BASKET).await;
        let response = client.post_htmx("/cart/add", BASKET).await;
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(
            response.headers.get("hx-trigger").and_then(|v| v.to_str().ok()),
            Some("cart-updated")
        );
        assert_eq!(response.body.trim(), "2");

        let count = client.get("/cart/count").await;
        assert_eq!(count.body.trim(), "2");
    }

    #[tokio::test]
    async fn test_update_and_remove_lines() {
        let mut client = client();
        client.post_form("/cart/add", BASKET).await;
        client.post_form("/cart/add", MUG).await;

        let fragment = client.post_htmx("/cart/update", "id=2&quantity=3").await;
        assert!(fragment.body.contains("id=\"cart-items\""));
        assert!(fragment.body.contains("4 items"));
        assert!(fragment.body.contains("$38.50"));

        let fragment = client.post_htmx("/cart/update", "id=1&quantity=0").await;
        assert!(!fragment.body.contains("Woven Basket"));
        assert!(fragment.body.contains("3 items"));

        let response = client.post_form("/cart/remove", "id=2").await;
        assert_eq!(response.location(), Some("/cart"));
        assert_eq!(client.get("/cart/count").await.body.trim(), "0");
    }

    #[tokio::test]
    async fn test_clear_empties_cart() {
        let mut client = client();
        client.post_form("/cart/add", BASKET).await;
        client.post_form("/cart/add", MUG).await;

        let fragment = client.post_htmx("/cart/clear", "").await;
        assert!(fragment.body.contains("Your cart is empty."));
        assert_eq!(client.get("/cart/count").await.body.trim(), "0");
    }

    #[tokio::test]
    async fn test_unparseable_price_adds_at_zero() {
        let mut client = client();
        client
            .post_form("/cart/add", "id=9&name=Mystery&price=call+us")
            .await;

        let page = client.get("/cart").await;
        assert!(page.body.contains("Mystery"));
        assert!(page.body.contains("$0.00"));
    }

    #[tokio::test]
    async fn test_huge_price_still_renders() {
        let mut client = client();
        let huge = "id=3&name=Gold+Mask&price=79228162514264337593543950335";
        client.post_form("/cart/add", huge).await;
        client.post_form("/cart/add", huge).await;

        let page = client.get("/cart").await;
        assert_eq!(page.status, StatusCode::OK);
        assert!(page.body.contains("$79228162514264337593543950335.00"));
    }
}
