//! Login, registration, profile and user endpoints.

use tracing::instrument;

use super::types::{
    AccessToken, AdminRegisterRequest, Listing, Login, LoginRequest, LoginResponse,
    RegisterRequest, UserProfile,
};
use super::{ApiError, MartApiClient};

impl MartApiClient {
    /// Exchange credentials for an access token (`POST /login/`).
    ///
    /// Used for both customer and admin sign-in.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::MissingToken` if the response has no
    /// `tokens.access`, or the API's error for rejected credentials.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<Login, ApiError> {
        let response: LoginResponse = self
            .send_json(
                reqwest::Method::POST,
                "login/",
                None,
                &LoginRequest { email, password },
            )
            .await?;

        let access = response
            .tokens
            .and_then(|t| t.access)
            .ok_or(ApiError::MissingToken)?;

        Ok(Login {
            access,
            user: response.user,
        })
    }

    /// Create a customer account (`POST /register/`).
    ///
    /// # Errors
    ///
    /// Returns the API's validation message on rejection.
    #[instrument(skip(self, password))]
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<(), ApiError> {
        self.send_expect_success(
            reqwest::Method::POST,
            "register/",
            None,
            &RegisterRequest {
                name,
                email,
                password,
            },
        )
        .await
    }

    /// Create an admin account (`POST /admin/register/`).
    ///
    /// The API checks `password_confirm` itself as well.
    ///
    /// # Errors
    ///
    /// Returns the API's validation message on rejection.
    #[instrument(skip(self, password, password_confirm))]
    pub async fn register_admin(
        &self,
        fullname: &str,
        email: &str,
        password: &str,
        password_confirm: &str,
    ) -> Result<(), ApiError> {
        self.send_expect_success(
            reqwest::Method::POST,
            "admin/register/",
            None,
            &AdminRegisterRequest {
                email,
                fullname,
                password,
                password_confirm,
                is_admin: true,
            },
        )
        .await
    }

    /// Revoke the token server-side (`POST /logout/`).
    ///
    /// # Errors
    ///
    /// Returns any non-success status or transport error. Callers sign the
    /// user out locally regardless.
    #[instrument(skip_all)]
    pub async fn logout(&self, token: &AccessToken) -> Result<(), ApiError> {
        self.post_empty("logout/", Some(token)).await
    }

    /// The signed-in user's profile (`GET /profile/`).
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` when the token is expired or invalid.
    #[instrument(skip(self, token))]
    pub async fn profile(&self, token: &AccessToken) -> Result<UserProfile, ApiError> {
        self.get_json("profile/", Some(token)).await
    }

    /// All users (`GET /admin/users/`); admin only.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Unauthorized` or a status error for non-admin tokens.
    #[instrument(skip(self, token))]
    pub async fn list_users(&self, token: &AccessToken) -> Result<Vec<UserProfile>, ApiError> {
        let listing: Listing<UserProfile> = self.get_json("admin/users/", Some(token)).await?;
        Ok(listing.into_vec())
    }
}
