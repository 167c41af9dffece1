//! Customer login, signup and logout.
//!
//! Credentials go straight to the MartAfrica API; the storefront keeps only
//! the returned access token in the session.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use martafrica_core::Email;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::api::ApiError;
use crate::error::{clear_sentry_user, set_sentry_user};
use crate::filters;
use crate::middleware::{
    OptionalCustomer, PageContext, clear_current_customer, set_current_customer, set_flash,
};
use crate::models::{CurrentCustomer, Flash};
use crate::state::AppState;

/// Shown when the API rejects the credentials.
pub const INVALID_CREDENTIALS: &str = "Invalid email or password.";

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Signup form data.
#[derive(Debug, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl SignupForm {
    /// Check the form before calling the API.
    ///
    /// # Errors
    ///
    /// Returns the message to show next to the form.
    pub fn validate(&self) -> Result<Email, &'static str> {
        if [&self.name, &self.email, &self.password]
            .iter()
            .any(|field| field.trim().is_empty())
        {
            return Err("Please fill in all fields.");
        }
        let email = Email::parse(&self.email).map_err(|_| "Please enter a valid email address.")?;
        if self.password != self.confirm_password {
            return Err("Passwords do not match");
        }
        Ok(email)
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub page: PageContext,
    pub email: String,
    pub error: Option<String>,
}

/// Signup page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/signup.html")]
pub struct SignupTemplate {
    pub page: PageContext,
    pub name: String,
    pub email: String,
    pub error: Option<String>,
}

// =============================================================================
// Login
// =============================================================================

/// Display the login page.
pub async fn login_page(page: PageContext) -> impl IntoResponse {
    LoginTemplate {
        page,
        email: String::new(),
        error: None,
    }
}

/// Handle login form submission.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    page: PageContext,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let render_error = |page: PageContext, email: String, message: String| {
        LoginTemplate {
            page,
            email,
            error: Some(message),
        }
        .into_response()
    };

    let email = match Email::parse(&form.email) {
        Ok(email) => email,
        Err(_) => {
            return render_error(page, form.email, "Please enter a valid email address.".to_string());
        }
    };

    let login = match state.api().login(email.as_str(), &form.password).await {
        Ok(login) => login,
        Err(ApiError::Unauthorized) => {
            return render_error(page, form.email, INVALID_CREDENTIALS.to_string());
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            return render_error(page, form.email, e.user_message("Login failed. Please try again."));
        }
    };

    let customer = CurrentCustomer {
        token: login.access,
        email: login
            .user
            .as_ref()
            .map_or_else(|| email.as_str().to_string(), |user| user.email.clone()),
        name: login
            .user
            .as_ref()
            .and_then(|user| user.fullname.clone())
            .filter(|name| !name.trim().is_empty()),
    };

    if let Err(e) = set_current_customer(&session, &customer).await {
        tracing::error!(error = %e, "Failed to store login in session");
        return render_error(
            page,
            form.email,
            "Login failed. Please try again.".to_string(),
        );
    }

    set_sentry_user(&customer.email);
    tracing::info!("Customer logged in");
    set_flash(
        &session,
        Flash::success(format!("Welcome back, {}!", customer.display_name())),
    )
    .await;
    Redirect::to("/").into_response()
}

// =============================================================================
// Signup
// =============================================================================

/// Display the signup page.
pub async fn signup_page(page: PageContext) -> impl IntoResponse {
    SignupTemplate {
        page,
        name: String::new(),
        email: String::new(),
        error: None,
    }
}

/// Handle signup form submission.
#[instrument(skip_all)]
pub async fn signup(
    State(state): State<AppState>,
    page: PageContext,
    session: Session,
    Form(form): Form<SignupForm>,
) -> Response {
    let render_error = |page: PageContext, form: SignupForm, message: String| {
        SignupTemplate {
            page,
            name: form.name,
            email: form.email,
            error: Some(message),
        }
        .into_response()
    };

    let email = match form.validate() {
        Ok(email) => email,
        Err(message) => return render_error(page, form, message.to_string()),
    };

    match state
        .api()
        .register(form.name.trim(), email.as_str(), &form.password)
        .await
    {
        Ok(()) => {
            tracing::info!("Customer account created");
            set_flash(&session, Flash::success("Account created. Please log in.")).await;
            Redirect::to("/auth/login").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Signup failed");
            let message = e.user_message("Signup failed. Please try again.");
            render_error(page, form, message)
        }
    }
}

// =============================================================================
// Logout
// =============================================================================

/// Sign the customer out. The cart stays in the session.
///
/// The API is asked to revoke the token first; the local sign-out happens
/// whatever it answers.
#[instrument(skip_all)]
pub async fn logout(
    State(state): State<AppState>,
    OptionalCustomer(customer): OptionalCustomer,
    session: Session,
) -> Response {
    if let Some(customer) = customer
        && let Err(e) = state.api().logout(&customer.token).await
    {
        tracing::warn!(error = %e, "API logout failed, signing out locally");
    }
    if let Err(e) = clear_current_customer(&session).await {
        tracing::error!(error = %e, "Failed to clear login from session");
    }
    clear_sentry_user();
    set_flash(&session, Flash::success("You have been logged out.")).await;
    Redirect::to("/").into_response()
}
