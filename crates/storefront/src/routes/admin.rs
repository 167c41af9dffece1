//! Read-only admin area.
//!
//! Admins sign in through the same API login as customers; the API decides
//! what the token may see. The dashboard shows counts, and each table page
//! lists one resource.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use martafrica_core::{Category, Email};
use tower_sessions::Session;
use tracing::instrument;

use crate::api::ApiError;
use crate::api::types::UserProfile;
use crate::filters;
use crate::middleware::auth::ADMIN_LOGIN_PATH;
use crate::middleware::{RequireAdmin, clear_current_admin, current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::routes::auth::{INVALID_CREDENTIALS, LoginForm, SignupForm};
use crate::routes::home::ProductCard;
use crate::state::AppState;

/// Admin login template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/login.html")]
pub struct AdminLoginTemplate {
    pub admin_email: Option<String>,
    pub email: String,
    pub error: Option<String>,
}

/// Admin signup template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/signup.html")]
pub struct AdminSignupTemplate {
    pub admin_email: Option<String>,
    pub name: String,
    pub email: String,
    pub error: Option<String>,
    pub success: Option<&'static str>,
}

/// One dashboard tile.
#[derive(Clone)]
pub struct DashboardTile {
    pub label: &'static str,
    pub href: &'static str,
    /// `None` when the count could not be loaded.
    pub count: Option<usize>,
}

/// Admin dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/dashboard.html")]
pub struct DashboardTemplate {
    pub admin_email: Option<String>,
    pub tiles: Vec<DashboardTile>,
}

/// Admin product table template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/products.html")]
pub struct AdminProductsTemplate {
    pub admin_email: Option<String>,
    pub products: Vec<ProductCard>,
    pub error: Option<String>,
}

/// Category row display data.
#[derive(Clone)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub description: String,
}

impl From<&Category> for CategoryRow {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id.as_i64(),
            name: category.name.clone(),
            description: category.description.clone().unwrap_or_default(),
        }
    }
}

/// Admin category table template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/categories.html")]
pub struct AdminCategoriesTemplate {
    pub admin_email: Option<String>,
    pub categories: Vec<CategoryRow>,
    pub error: Option<String>,
}

/// User row display data.
#[derive(Clone)]
pub struct UserRow {
    pub name: String,
    pub email: String,
    pub joined: String,
    pub is_staff: bool,
}

impl From<&UserProfile> for UserRow {
    fn from(user: &UserProfile) -> Self {
        Self {
            name: user.display_name().to_string(),
            email: user.email.clone(),
            joined: user.joined_on().unwrap_or_default().to_string(),
            is_staff: user.is_staff.unwrap_or(false),
        }
    }
}

/// Admin user table template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/users.html")]
pub struct AdminUsersTemplate {
    pub admin_email: Option<String>,
    pub users: Vec<UserRow>,
    pub error: Option<String>,
}

/// Sign the admin out after the API rejected their token.
async fn admin_session_expired(session: &Session) -> Response {
    if let Err(e) = clear_current_admin(session).await {
        tracing::warn!(error = %e, "Failed to clear expired admin login");
    }
    Redirect::to(ADMIN_LOGIN_PATH).into_response()
}

/// Display the admin login page.
pub async fn login_page() -> impl IntoResponse {
    AdminLoginTemplate {
        admin_email: None,
        email: String::new(),
        error: None,
    }
}

/// Handle admin login.
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let render_error = |email: String, message: String| {
        AdminLoginTemplate {
            admin_email: None,
            email,
            error: Some(message),
        }
        .into_response()
    };

    let Ok(email) = Email::parse(&form.email) else {
        return render_error(form.email, "Please enter a valid email address.".to_string());
    };

    let login = match state.api().login(email.as_str(), &form.password).await {
        Ok(login) => login,
        Err(ApiError::Unauthorized) => {
            return render_error(form.email, INVALID_CREDENTIALS.to_string());
        }
        Err(e) => {
            tracing::warn!(error = %e, "Admin login failed");
            return render_error(form.email, e.user_message("Login failed"));
        }
    };

    let admin = CurrentAdmin {
        token: login.access,
        email: email.as_str().to_string(),
    };
    if let Err(e) = set_current_admin(&session, &admin).await {
        tracing::error!(error = %e, "Failed to store admin login in session");
        return render_error(form.email, "Login failed".to_string());
    }

    tracing::info!("Admin logged in");
    Redirect::to("/admin").into_response()
}

/// Display the admin signup page.
pub async fn signup_page() -> impl IntoResponse {
    AdminSignupTemplate {
        admin_email: None,
        name: String::new(),
        email: String::new(),
        error: None,
        success: None,
    }
}

/// Register a new admin account. The new admin signs in afterwards.
#[instrument(skip_all)]
pub async fn signup(State(state): State<AppState>, Form(form): Form<SignupForm>) -> Response {
    let render_error = |form: SignupForm, message: String| {
        AdminSignupTemplate {
            admin_email: None,
            name: form.name,
            email: form.email,
            error: Some(message),
            success: None,
        }
        .into_response()
    };

    let email = match form.validate() {
        Ok(email) => email,
        Err(message) => return render_error(form, message.to_string()),
    };

    match state
        .api()
        .register_admin(
            form.name.trim(),
            email.as_str(),
            &form.password,
            &form.confirm_password,
        )
        .await
    {
        Ok(()) => {
            tracing::info!("Admin account created");
            AdminSignupTemplate {
                admin_email: None,
                name: String::new(),
                email: String::new(),
                error: None,
                success: Some("Signup successful! You can now sign in."),
            }
            .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Admin signup failed");
            let message = e.user_message("Signup failed. Please try again.");
            render_error(form, message)
        }
    }
}

/// Sign the admin out, revoking the token with the API when it answers.
#[instrument(skip_all)]
pub async fn logout(State(state): State<AppState>, session: Session) -> Response {
    if let Some(admin) = current_admin(&session).await
        && let Err(e) = state.api().logout(&admin.token).await
    {
        tracing::warn!(error = %e, "API logout failed, signing out locally");
    }
    if let Err(e) = clear_current_admin(&session).await {
        tracing::error!(error = %e, "Failed to clear admin login from session");
    }
    Redirect::to(ADMIN_LOGIN_PATH).into_response()
}

/// Dashboard with resource counts, fetched concurrently.
#[instrument(skip_all)]
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
) -> Response {
    let api = state.api();
    let (products, categories, users) = tokio::join!(
        api.list_products(),
        api.list_categories(Some(&admin.token)),
        api.list_users(&admin.token),
    );

    if matches!(categories, Err(ApiError::Unauthorized))
        || matches!(users, Err(ApiError::Unauthorized))
    {
        return admin_session_expired(&session).await;
    }

    let count = |label: &str, result: Result<usize, ApiError>| match result {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(error = %e, resource = label, "Failed to load dashboard count");
            None
        }
    };

    DashboardTemplate {
        tiles: vec![
            DashboardTile {
                label: "Products",
                href: "/admin/products",
                count: count("products", products.map(|p| p.len())),
            },
            DashboardTile {
                label: "Categories",
                href: "/admin/categories",
                count: count("categories", categories.map(|c| c.len())),
            },
            DashboardTile {
                label: "Users",
                href: "/admin/users",
                count: count("users", users.map(|u| u.len())),
            },
        ],
        admin_email: Some(admin.email),
    }
    .into_response()
}

/// Product table.
#[instrument(skip_all)]
pub async fn products(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
) -> impl IntoResponse {
    let (products, error) = match state.api().list_products().await {
        Ok(products) => (products.iter().map(ProductCard::from).collect(), None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load products");
            (Vec::new(), Some("Failed to load products.".to_string()))
        }
    };

    AdminProductsTemplate {
        admin_email: Some(admin.email),
        products,
        error,
    }
}

/// Category table.
#[instrument(skip_all)]
pub async fn categories(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
) -> Response {
    let (categories, error) = match state.api().list_categories(Some(&admin.token)).await {
        Ok(categories) => (categories.iter().map(CategoryRow::from).collect(), None),
        Err(ApiError::Unauthorized) => return admin_session_expired(&session).await,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load categories");
            (Vec::new(), Some("Failed to load categories.".to_string()))
        }
    };

    AdminCategoriesTemplate {
        admin_email: Some(admin.email),
        categories,
        error,
    }
    .into_response()
}

/// User table.
#[instrument(skip_all)]
pub async fn users(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    session: Session,
) -> Response {
    let (users, error) = match state.api().list_users(&admin.token).await {
        Ok(users) => (users.iter().map(UserRow::from).collect(), None),
        Err(ApiError::Unauthorized) => return admin_session_expired(&session).await,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load users");
            (Vec::new(), Some("Failed to load users.".to_string()))
        }
    };

    AdminUsersTemplate {
        admin_email: Some(admin.email),
        users,
        error,
    }
    .into_response()
}
