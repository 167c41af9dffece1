//! Account (profile) page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;
use tracing::instrument;

use crate::api::ApiError;
use crate::api::types::UserProfile;
use crate::filters;
use crate::middleware::{PageContext, RequireCustomer};
use crate::routes::session_expired;
use crate::state::AppState;

/// Profile display data.
#[derive(Clone)]
pub struct ProfileView {
    pub name: String,
    pub email: String,
    pub member_since: Option<String>,
}

impl From<&UserProfile> for ProfileView {
    fn from(profile: &UserProfile) -> Self {
        Self {
            name: profile.display_name().to_string(),
            email: profile.email.clone(),
            member_since: profile.joined_on().map(str::to_owned),
        }
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "account/profile.html")]
pub struct ProfileTemplate {
    pub page: PageContext,
    pub profile: ProfileView,
    pub error: Option<String>,
}

/// Display the signed-in customer's profile.
///
/// Falls back to what the session knows if the API is unavailable.
#[instrument(skip_all)]
pub async fn profile(
    State(state): State<AppState>,
    RequireCustomer(customer): RequireCustomer,
    page: PageContext,
    session: Session,
) -> Response {
    match state.api().profile(&customer.token).await {
        Ok(profile) => ProfileTemplate {
            page,
            profile: ProfileView::from(&profile),
            error: None,
        }
        .into_response(),
        Err(ApiError::Unauthorized) => session_expired(&session).await,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch profile");
            ProfileTemplate {
                page,
                profile: ProfileView {
                    name: customer.display_name().to_string(),
                    email: customer.email.clone(),
                    member_since: None,
                },
                error: Some("Could not load your full profile right now.".to_string()),
            }
            .into_response()
        }
    }
}
