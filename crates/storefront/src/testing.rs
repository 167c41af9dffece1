//! Test harness: an in-process stand-in for the MartAfrica API and a
//! cookie-carrying client for the storefront router.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::routing::post;
use axum::{Json, Router};
use axum::http::{HeaderMap, Request, StatusCode, header};
use secrecy::SecretString;
use serde_json::json;
use sqlx::sqlite::SqlitePoolOptions;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use crate::api::MartApiClient;
use crate::config::{ApiConfig, StorefrontConfig};
use crate::state::AppState;

/// Serve `router` on an ephemeral port and return its `/api` base URL.
pub async fn spawn_api(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/api")
}

/// API routes that accept any login and issue the token `test-token`.
pub fn login_api() -> Router {
    Router::new().route(
        "/api/login/",
        post(|| async {
            Json(json!({
                "tokens": {"access": "test-token", "refresh": "test-refresh"},
                "user": {"email": "ada@example.com", "fullname": "Ada"}
            }))
        }),
    )
}

/// A client for an API base URL.
pub fn api_client(base_url: &str) -> MartApiClient {
    MartApiClient::new(&ApiConfig::with_base_url(base_url).unwrap()).unwrap()
}

/// Application state pointed at `api_url`, with a lazily connected
/// in-memory session database.
pub fn test_state(api_url: &str) -> AppState {
    let config = StorefrontConfig {
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        base_url: "http://localhost:3000".to_string(),
        session_database_url: SecretString::from("sqlite::memory:"),
        api: ApiConfig::with_base_url(api_url).unwrap(),
        sentry_dsn: None,
        sentry_environment: None,
    };
    let pool = SqlitePoolOptions::new()
        .connect_lazy("sqlite::memory:")
        .unwrap();
    AppState::new(config, pool).unwrap()
}

/// A rendered response.
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// The `Location` header of a redirect.
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|v| v.to_str().ok())
    }
}

/// Drives the storefront router like a browser: one session cookie, one
/// client IP.
pub struct TestClient {
    app: Router,
    cookie: Option<String>,
}

impl TestClient {
    pub fn new(state: AppState) -> Self {
        Self {
            app: crate::app(state, MemoryStore::default()),
            cookie: None,
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Request::get(uri), Body::empty()).await
    }

    pub async fn post_form(&mut self, uri: &str, form: &str) -> TestResponse {
        let builder = Request::post(uri).header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
        self.send(builder, Body::from(form.to_string())).await
    }

    pub async fn post_htmx(&mut self, uri: &str, form: &str) -> TestResponse {
        let builder = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("hx-request", "true");
        self.send(builder, Body::from(form.to_string())).await
    }

    /// Sign in as a customer through `/auth/login`.
    pub async fn log_in(&mut self) {
        let response = self
            .post_form("/auth/login", "email=ada%40example.com&password=hunter2")
            .await;
        assert_eq!(response.location(), Some("/"), "login failed: {}", response.body);
    }

    async fn send(&mut self, builder: axum::http::request::Builder, body: Body) -> TestResponse {
        let mut builder = builder.header("x-forwarded-for", "203.0.113.10");
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }

        let response = self
            .app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();

        if let Some(set_cookie) = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            && let Some((pair, _)) = set_cookie.split_once(';')
        {
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();

        TestResponse {
            status,
            headers,
            body: String::from_utf8(bytes.to_vec()).unwrap(),
        }
    }
}
