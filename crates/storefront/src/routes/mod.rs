//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Product listing
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (session database)
//! GET  /products/{id}          - Product detail
//! GET  /search?q=              - Search results
//!
//! # Cart (full pages, or HTMX fragments when `HX-Request` is set)
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add product (id, name, price, primary_image)
//! POST /cart/update            - Set quantity (id, quantity; <= 0 removes)
//! POST /cart/remove            - Remove line (id)
//! POST /cart/clear             - Empty the cart
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout (requires customer)
//! GET  /checkout               - Shipping form and order summary
//! POST /checkout               - Place order
//! GET  /order-success          - Confirmation
//!
//! # Wishlist (requires customer)
//! GET  /wishlist               - Saved products
//! POST /wishlist/add           - Save a product (product_id)
//! POST /wishlist/{id}/remove   - Remove an entry
//! POST /wishlist/{id}/move     - Move an entry to the cart
//!
//! # Auth (rate limited)
//! GET  /auth/login             - Login page
//! POST /auth/login             - Login action
//! GET  /auth/signup            - Signup page
//! POST /auth/signup            - Signup action
//! POST /auth/logout            - Logout (keeps the cart)
//!
//! # Account (requires customer)
//! GET  /account                - Profile
//!
//! # Admin (read-only, requires admin)
//! GET  /admin/login            - Admin login page
//! POST /admin/login            - Admin login action (rate limited)
//! GET  /admin/signup           - Admin signup page
//! POST /admin/signup           - Admin signup action (rate limited)
//! POST /admin/logout           - Admin logout
//! GET  /admin                  - Dashboard
//! GET  /admin/products         - Product table
//! GET  /admin/categories       - Category table
//! GET  /admin/users            - User table
//! ```

pub mod account;
pub mod admin;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod health;
pub mod home;
pub mod products;
pub mod search;
pub mod wishlist;

use axum::{
    Router,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use tower_sessions::Session;

use crate::middleware::auth::CUSTOMER_LOGIN_PATH;
use crate::middleware::{auth_rate_limiter, clear_current_customer, set_flash};
use crate::models::Flash;
use crate::state::AppState;

/// Whether the request was issued by htmx and expects a fragment.
pub(crate) fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// Sign the customer out after the API rejected their token.
pub(crate) async fn session_expired(session: &Session) -> Response {
    if let Err(e) = clear_current_customer(session).await {
        tracing::warn!(error = %e, "Failed to clear expired customer login");
    }
    set_flash(
        session,
        Flash::error("Your session has expired. Please log in again."),
    )
    .await;
    Redirect::to(CUSTOMER_LOGIN_PATH).into_response()
}

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/signup", get(auth::signup_page).post(auth::signup))
        .route("/logout", post(auth::logout))
        .layer(auth_rate_limiter())
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new().route("/{id}", get(products::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the wishlist routes router.
pub fn wishlist_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(wishlist::show))
        .route("/add", post(wishlist::add))
        .route("/{id}/remove", post(wishlist::remove))
        .route("/{id}/move", post(wishlist::move_to_cart))
}

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(admin::login_page).post(admin::login))
        .route("/signup", get(admin::signup_page).post(admin::signup))
        // Applies only to the routes above
        .layer(auth_rate_limiter())
        .route("/logout", post(admin::logout))
        .route("/", get(admin::dashboard))
        .route("/products", get(admin::products))
        .route("/categories", get(admin::categories))
        .route("/users", get(admin::users))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home::home))
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .route("/search", get(search::search))
        .nest("/products", product_routes())
        .nest("/cart", cart_routes())
        .route("/checkout", get(checkout::show).post(checkout::place_order))
        .route("/order-success", get(checkout::success))
        .nest("/wishlist", wishlist_routes())
        .route("/account", get(account::profile))
        .nest("/auth", auth_routes())
        .nest("/admin", admin_routes())
}
