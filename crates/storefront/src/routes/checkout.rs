//! Checkout and order confirmation.
//!
//! The cart is cleared only after the API accepts the order. Validation and
//! API failures re-render the form with the cart untouched.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use martafrica_core::{Cart, OrderId};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::ApiError;
use crate::api::types::{OrderItem, OrderRequest};
use crate::cart::SessionCart;
use crate::error::add_breadcrumb;
use crate::filters;
use crate::middleware::{PageContext, RequireCustomer};
use crate::models::session_keys;
use crate::routes::cart::CartView;
use crate::routes::session_expired;
use crate::state::AppState;

/// Shown when any shipping field is blank.
pub const MISSING_SHIPPING_DETAILS: &str = "Please fill in all shipping details.";

/// Shipping details form. Missing fields deserialize as blank so they reach
/// validation instead of being rejected by the extractor.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ShippingForm {
    pub shipping_address: String,
    pub city: String,
    pub postal_code: String,
}

impl ShippingForm {
    /// Whether every field has non-blank content.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        [&self.shipping_address, &self.city, &self.postal_code]
            .iter()
            .all(|field| !field.trim().is_empty())
    }

    /// The order submission for `cart` shipped to this address.
    #[must_use]
    pub fn order_request(&self, cart: &Cart) -> OrderRequest {
        OrderRequest {
            shipping_address: self.shipping_address.trim().to_string(),
            city: self.city.trim().to_string(),
            postal_code: self.postal_code.trim().to_string(),
            order_items: cart
                .lines()
                .iter()
                .map(|line| OrderItem {
                    product_id: line.id,
                    quantity: line.quantity,
                })
                .collect(),
        }
    }
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/show.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub cart: CartView,
    pub form: ShippingForm,
    pub error: Option<String>,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct OrderSuccessTemplate {
    pub page: PageContext,
    pub order_id: Option<i64>,
}

/// Display the shipping form with an order summary.
#[instrument(skip_all)]
pub async fn show(
    RequireCustomer(_customer): RequireCustomer,
    page: PageContext,
    session: Session,
) -> Response {
    let cart = SessionCart::load(session).await;
    if cart.cart().is_empty() {
        return Redirect::to("/cart").into_response();
    }

    CheckoutTemplate {
        page,
        cart: CartView::from(cart.cart()),
        form: ShippingForm::default(),
        error: None,
    }
    .into_response()
}

/// Place the order.
#[instrument(skip_all)]
pub async fn place_order(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    page: PageContext,
    session: Session,
    Form(form): Form<ShippingForm>,
) -> Response {
    let mut cart = SessionCart::load(session.clone()).await;
    if cart.cart().is_empty() {
        return Redirect::to("/cart").into_response();
    }

    let render_error = |page: PageContext, cart: &Cart, form: ShippingForm, message: String| {
        CheckoutTemplate {
            page,
            cart: CartView::from(cart),
            form,
            error: Some(message),
        }
        .into_response()
    };

    if !form.is_complete() {
        return render_error(page, cart.cart(), form, MISSING_SHIPPING_DETAILS.to_string());
    }

    let order = form.order_request(cart.cart());
    match state.api().place_order(&customer.token, &order).await {
        Ok(placed) => {
            tracing::info!(order_id = ?placed.id, lines = order.order_items.len(), "Order placed");
            add_breadcrumb("checkout", "Order placed", None);

            cart.store().clear_cart();
            cart.commit().await;
            if let Some(id) = placed.id
                && let Err(e) = session.insert(session_keys::LAST_ORDER, id).await
            {
                tracing::warn!(error = %e, "Failed to remember placed order");
            }
            Redirect::to("/order-success").into_response()
        }
        Err(ApiError::Unauthorized) => session_expired(&session).await,
        Err(e) => {
            tracing::warn!(error = %e, "Order rejected");
            let message = e.user_message("Failed to place order. Please try again.");
            render_error(page, cart.cart(), form, message)
        }
    }
}

/// Order confirmation page.
#[instrument(skip_all)]
pub async fn success(page: PageContext, session: Session) -> impl IntoResponse {
    let order_id = match session.remove::<OrderId>(session_keys::LAST_ORDER).await {
        Ok(id) => id.map(|id| id.as_i64()),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable order id");
            None
        }
    };

    OrderSuccessTemplate { page, order_id }
}
