//! Per-page layout data.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use super::auth::{OptionalCustomer, take_flash};
use crate::cart::SessionCart;
use crate::models::Flash;

/// What the shared page layout needs: who is signed in, the cart badge
/// count and any pending flash message. Extracting it consumes the flash.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub customer_name: Option<String>,
    pub cart_count: u64,
    pub flash: Option<Flash>,
}

impl PageContext {
    /// Attach a message raised while handling this request.
    #[must_use]
    pub fn with_flash(mut self, flash: Flash) -> Self {
        self.flash = Some(flash);
        self
    }

    /// Refresh the badge after the handler changed the cart.
    #[must_use]
    pub fn with_cart_count(mut self, count: u64) -> Self {
        self.cart_count = count;
        self
    }
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let OptionalCustomer(customer) = OptionalCustomer::from_request_parts(parts, state).await?;
        let (cart_count, flash) = match parts.extensions.get::<Session>() {
            Some(session) => {
                let cart = SessionCart::load(session.clone()).await;
                (cart.cart().total_items(), take_flash(session).await)
            }
            None => (0, None),
        };

        Ok(Self {
            customer_name: customer.map(|c| c.display_name().to_string()),
            cart_count,
            flash,
        })
    }
}
