//! Shared harness for API integration tests.
//!
//! Builds the full router over in-memory stores so tests run without a
//! database, mirroring the middleware stack in `main.rs`.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{HeaderName, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use chrono::Utc;
use http_body_util::BodyExt;
use serenade_api::auth::jwt::{generate_access_token, JwtConfig};
use serenade_api::config::ServerConfig;
use serenade_api::routes;
use serenade_api::state::AppState;
use serenade_core::delivery::DeliveryIntent;
use serenade_core::error::CoreError;
use serenade_core::ports::Notifier;
use serenade_core::user::{UserProfile, ROLE_ADMIN, ROLE_CUSTOMER};
use serenade_db::{InMemoryRequestStore, InMemoryUserDirectory};
use serenade_events::{EventBus, FeedScope};
use serenade_fulfillment::{FulfillmentCoordinator, ReconciliationLoop};
use tower::ServiceExt;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;

pub const CUSTOMER_ID: i64 = 7;
pub const OTHER_CUSTOMER_ID: i64 = 8;
pub const ADMIN_ID: i64 = 1;
pub const WEBHOOK_SECRET: &str = "whsec-test";

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<DeliveryIntent>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, intent: &DeliveryIntent) -> Result<(), CoreError> {
        self.sent.lock().unwrap().push(intent.clone());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub config: ServerConfig,
    pub store: Arc<InMemoryRequestStore>,
    pub users: Arc<InMemoryUserDirectory>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    pub fn customer_token(&self) -> String {
        self.token(CUSTOMER_ID, ROLE_CUSTOMER)
    }

    pub fn other_customer_token(&self) -> String {
        self.token(OTHER_CUSTOMER_ID, ROLE_CUSTOMER)
    }

    pub fn admin_token(&self) -> String {
        self.token(ADMIN_ID, ROLE_ADMIN)
    }

    pub fn token(&self, user_id: i64, role: &str) -> String {
        generate_access_token(user_id, role, &self.config.jwt).expect("token generation")
    }
}

pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
        payment_webhook_secret: Some(WEBHOOK_SECRET.to_string()),
    }
}

pub async fn build_test_app() -> TestApp {
    let config = test_config();
    let store = Arc::new(InMemoryRequestStore::new());
    let users = Arc::new(InMemoryUserDirectory::new());
    let notifier = Arc::new(RecordingNotifier::default());
    let bus = Arc::new(EventBus::default());

    users
        .insert_user(UserProfile {
            id: CUSTOMER_ID,
            name: "Marta".to_string(),
            email: "marta@example.com".to_string(),
            contact_handle: None,
            created_at: Utc::now(),
        })
        .await;

    let coordinator = Arc::new(
        FulfillmentCoordinator::new(store.clone(), users.clone(), notifier.clone())
            .with_event_bus(bus),
    );
    let admin_board = Arc::new(ReconciliationLoop::new(store.clone(), FeedScope::Admin));

    let state = AppState {
        pool: None,
        config: Arc::new(config.clone()),
        store: store.clone(),
        testimonials: users.clone(),
        coordinator,
        admin_board,
    };

    let request_id_header = HeaderName::from_static("x-request-id");
    let router = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1", routes::api_routes())
        .layer(CatchPanicLayer::new())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(30),
        ))
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .with_state(state);

    TestApp {
        router,
        config,
        store,
        users,
        notifier,
    }
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn send(app: &TestApp, request: Request<Body>) -> Response {
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &TestApp, uri: &str) -> Response {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: &TestApp, uri: &str, token: &str) -> Response {
    let request = Request::get(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_json_auth(
    app: &TestApp,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    json_request(app, "POST", uri, token, body).await
}

pub async fn put_json_auth(
    app: &TestApp,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    json_request(app, "PUT", uri, token, body).await
}

async fn json_request(
    app: &TestApp,
    method: &str,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Submit a request as the default customer and return its id.
pub async fn submit(app: &TestApp) -> String {
    let response = post_json_auth(
        app,
        "/api/v1/requests",
        &app.customer_token(),
        serde_json::json!({
            "honoree_name": "Papa Joe",
            "story": "Forty years of fishing trips",
            "genre": "country",
            "tone": "nostalgic",
            "voice": "male"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}
