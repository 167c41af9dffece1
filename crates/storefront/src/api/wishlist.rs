//! Wishlist endpoints.
//!
//! Deletes use the wishlist entry id, not the product id.

use martafrica_core::{ProductId, Wishlist, WishlistEntry, WishlistEntryId};
use reqwest::{Method, StatusCode};
use tracing::instrument;

use super::types::{AccessToken, Listing, WishlistAddRequest};
use super::{ApiError, MartApiClient};

impl MartApiClient {
    /// Fetch the user's wishlist (`GET /wishlist/`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` for a bad token, or a transport error.
    #[instrument(skip(self, token))]
    pub async fn wishlist(&self, token: &AccessToken) -> Result<Wishlist, ApiError> {
        let listing: Listing<WishlistEntry> = self.get_json("wishlist/", Some(token)).await?;
        Ok(Wishlist::new(listing.into_vec()))
    }

    /// Save a product (`POST /wishlist/`).
    ///
    /// # Errors
    ///
    /// The API answers 400 with an `error` message when the product is
    /// already saved; that message is carried in `ApiError::Status`.
    #[instrument(skip(self, token))]
    pub async fn add_to_wishlist(
        &self,
        token: &AccessToken,
        product_id: ProductId,
    ) -> Result<(), ApiError> {
        self.send_expect_success(
            Method::POST,
            "wishlist/",
            Some(token),
            &WishlistAddRequest { product_id },
        )
        .await
    }

    /// Delete an entry (`DELETE /wishlist/{id}/`).
    ///
    /// Only `204 No Content` counts as success.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Status` for any other status, or a transport error.
    #[instrument(skip(self, token))]
    pub async fn remove_from_wishlist(
        &self,
        token: &AccessToken,
        entry_id: WishlistEntryId,
    ) -> Result<(), ApiError> {
        let response = self
            .request(Method::DELETE, &format!("wishlist/{entry_id}/"), Some(token))?
            .send()
            .await?;

        match response.status() {
            StatusCode::NO_CONTENT => Ok(()),
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
            status => Err(ApiError::Status {
                status: status.as_u16(),
                message: "Failed to remove item from wishlist".to_string(),
            }),
        }
    }
}
