//! Authentication extractors and session helpers.
//!
//! Customers and admins both authenticate against the MartAfrica API and hold
//! a Bearer token in the session. The two logins are independent: signing in
//! to the admin area does not sign in a customer, and vice versa.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentAdmin, CurrentCustomer, Flash, session_keys};

/// Customer login page.
pub const CUSTOMER_LOGIN_PATH: &str = "/auth/login";

/// Admin login page.
pub const ADMIN_LOGIN_PATH: &str = "/admin/login";

/// Extractor that requires a signed-in customer.
///
/// Redirects to the login page when there is none.
///
/// # Example
///
/// ```rust,ignore
/// async fn account(RequireCustomer(customer): RequireCustomer) -> impl IntoResponse {
///     format!("Hello, {}!", customer.display_name())
/// }
/// ```
pub struct RequireCustomer(pub CurrentCustomer);

/// Extractor that requires a signed-in admin.
pub struct RequireAdmin(pub CurrentAdmin);

/// Error returned when a login is required but missing.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to a login page.
    RedirectTo(&'static str),
    /// No session layer in front of the handler.
    Unauthorized,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectTo(path) => Redirect::to(path).into_response(),
            Self::Unauthorized => StatusCode::UNAUTHORIZED.into_response(),
        }
    }
}

/// Read a session value, treating unreadable data as absent.
async fn session_value<T>(session: &Session, key: &str) -> Option<T>
where
    T: serde::de::DeserializeOwned,
{
    match session.get::<T>(key).await {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "Ignoring unreadable session value");
            None
        }
    }
}

impl<S> FromRequestParts<S> for RequireCustomer
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        session_value(session, session_keys::CURRENT_CUSTOMER)
            .await
            .map(Self)
            .ok_or(AuthRejection::RedirectTo(CUSTOMER_LOGIN_PATH))
    }
}

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(AuthRejection::Unauthorized)?;

        session_value(session, session_keys::CURRENT_ADMIN)
            .await
            .map(Self)
            .ok_or(AuthRejection::RedirectTo(ADMIN_LOGIN_PATH))
    }
}

/// Extractor that optionally gets the signed-in customer.
pub struct OptionalCustomer(pub Option<CurrentCustomer>);

impl<S> FromRequestParts<S> for OptionalCustomer
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let customer = match parts.extensions.get::<Session>() {
            Some(session) => session_value(session, session_keys::CURRENT_CUSTOMER).await,
            None => None,
        };

        Ok(Self(customer))
    }
}

/// Store the signed-in customer, rotating the session id first.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_customer(
    session: &Session,
    customer: &CurrentCustomer,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_CUSTOMER, customer)
        .await
}

/// Forget the signed-in customer. The cart stays in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_customer(
    session: &Session,
) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentCustomer>(session_keys::CURRENT_CUSTOMER)
        .await?;
    Ok(())
}

/// Store the signed-in admin, rotating the session id first.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// The signed-in admin, if any.
pub async fn current_admin(session: &Session) -> Option<CurrentAdmin> {
    session_value(session, session_keys::CURRENT_ADMIN).await
}

/// Forget the signed-in admin.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    Ok(())
}

/// Queue a message for the next rendered page. Failures are logged.
pub async fn set_flash(session: &Session, flash: Flash) {
    if let Err(e) = session.insert(session_keys::FLASH, flash).await {
        tracing::warn!(error = %e, "Failed to store flash message");
    }
}

/// Take the pending flash message, if any.
pub async fn take_flash(session: &Session) -> Option<Flash> {
    match session.remove::<Flash>(session_keys::FLASH).await {
        Ok(flash) => flash,
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring unreadable flash message");
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use axum::http::Request;
    use tower_sessions::MemoryStore;

    use super::*;
    use crate::api::AccessToken;

    fn parts_with(session: Option<Session>) -> Parts {
        let (mut parts, ()) = Request::builder()
            .uri("/checkout")
            .body(())
            .unwrap()
            .into_parts();
        if let Some(session) = session {
            parts.extensions.insert(session);
        }
        parts
    }

    fn new_session() -> Session {
        Session::new(None, Arc::new(MemoryStore::default()), None)
    }

    fn customer() -> CurrentCustomer {
        CurrentCustomer {
            token: AccessToken::new("tok"),
            email: "ada@example.com".to_string(),
            name: None,
        }
    }

    #[tokio::test]
    async fn test_require_customer_redirects_when_signed_out() {
        let mut parts = parts_with(Some(new_session()));
        let rejection = RequireCustomer::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert!(matches!(rejection, AuthRejection::RedirectTo(CUSTOMER_LOGIN_PATH)));
    }

    #[tokio::test]
    async fn test_require_customer_without_session_layer() {
        let mut parts = parts_with(None);
        let rejection = RequireCustomer::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert_eq!(rejection.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_customer_round_trip_and_logout() {
        let session = new_session();
        set_current_customer(&session, &customer()).await.unwrap();

        let mut parts = parts_with(Some(session.clone()));
        let RequireCustomer(found) = RequireCustomer::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert_eq!(found.token.expose(), "tok");
        assert_eq!(found.display_name(), "ada@example.com");

        clear_current_customer(&session).await.unwrap();
        let mut parts = parts_with(Some(session));
        let OptionalCustomer(found) = OptionalCustomer::from_request_parts(&mut parts, &())
            .await
            .unwrap();
        assert!(found.is_none());
    }

    #[tokio::test]
    async fn test_customer_login_does_not_grant_admin() {
        let session = new_session();
        set_current_customer(&session, &customer()).await.unwrap();

        let mut parts = parts_with(Some(session));
        let rejection = RequireAdmin::from_request_parts(&mut parts, &())
            .await
            .err()
            .unwrap();
        assert!(matches!(rejection, AuthRejection::RedirectTo(ADMIN_LOGIN_PATH)));
    }

    #[tokio::test]
    async fn test_flash_is_shown_once() {
        let session = new_session();
        set_flash(&session, Flash::success("Saved")).await;
        assert_eq!(take_flash(&session).await, Some(Flash::success("Saved")));
        assert_eq!(take_flash(&session).await, None);
    }
}
