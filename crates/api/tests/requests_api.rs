//! Customer-facing request endpoints.

mod common;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use common::{body_json, build_test_app, get, get_auth, post_json_auth, submit};
use serde_json::json;

const SONG: &str = "https://cdn.example.com/final/song.mp3";

async fn attach(app: &common::TestApp, id: &str) {
    let response = post_json_auth(
        app,
        &format!("/api/v1/admin/requests/{id}/media"),
        &app.admin_token(),
        json!({ "media_ref": SONG }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn submit_returns_pending_unpaid_view() {
    let app = build_test_app().await;
    let response = post_json_auth(
        &app,
        "/api/v1/requests",
        &app.customer_token(),
        json!({
            "honoree_name": "  Grandma Rose ",
            "story": "She taught everyone to dance",
            "genre": "jazz",
            "tone": "joyful",
            "voice": "female"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["honoree_name"], "Grandma Rose");
    assert_eq!(json["data"]["status"], "pending");
    assert_eq!(json["data"]["payment_status"], "unpaid");
    assert_eq!(json["data"]["progress"], 25);
    assert_eq!(json["data"]["access_level"], "no_access");
    assert!(json["data"]["full_media"].is_null());
}

#[tokio::test]
async fn submit_with_client_id_is_idempotent() {
    let app = build_test_app().await;
    let id = uuid::Uuid::now_v7();
    let body = json!({
        "id": id,
        "honoree_name": "Papa Joe",
        "story": "Fishing trips",
        "genre": "country",
        "tone": "nostalgic",
        "voice": "male"
    });

    for _ in 0..2 {
        let response =
            post_json_auth(&app, "/api/v1/requests", &app.customer_token(), body.clone()).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(body_json(response).await["data"]["id"], id.to_string());
    }

    let listed = body_json(get_auth(&app, "/api/v1/requests", &app.customer_token()).await).await;
    assert_eq!(listed["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn blank_honoree_is_a_validation_error() {
    let app = build_test_app().await;
    let response = post_json_auth(
        &app,
        "/api/v1/requests",
        &app.customer_token(),
        json!({
            "honoree_name": "   ",
            "story": "Story",
            "genre": "pop",
            "tone": "happy",
            "voice": "duet"
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn requests_require_a_token() {
    let app = build_test_app().await;
    let response = get(&app, "/api/v1/requests").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn other_customers_cannot_read_a_request() {
    let app = build_test_app().await;
    let id = submit(&app).await;

    let response = get_auth(
        &app,
        &format!("/api/v1/requests/{id}"),
        &app.other_customer_token(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(body_json(response).await["code"], "ACCESS_DENIED");
}

#[tokio::test]
async fn full_track_is_locked_until_payment() {
    let app = build_test_app().await;
    let id = submit(&app).await;
    attach(&app, &id).await;

    let preview = get_auth(
        &app,
        &format!("/api/v1/requests/{id}/media/preview"),
        &app.customer_token(),
    )
    .await;
    assert_eq!(preview.status(), StatusCode::OK);
    assert_eq!(body_json(preview).await["data"]["media_ref"], SONG);

    let full = get_auth(
        &app,
        &format!("/api/v1/requests/{id}/media/full"),
        &app.customer_token(),
    )
    .await;
    assert_eq!(full.status(), StatusCode::FORBIDDEN);
    let json = body_json(full).await;
    assert_eq!(json["code"], "ACCESS_DENIED");
    assert_matches!(json["error"].as_str(), Some(message) if message.contains("payment"));

    let view = body_json(
        get_auth(&app, &format!("/api/v1/requests/{id}"), &app.customer_token()).await,
    )
    .await;
    assert_eq!(view["data"]["access_level"], "preview_only");
    assert!(view["data"]["full_media"].is_null());
}

#[tokio::test]
async fn listing_puts_awaiting_payment_first() {
    let app = build_test_app().await;
    let older = submit(&app).await;
    let finished = submit(&app).await;
    attach(&app, &finished).await;

    let json = body_json(get_auth(&app, "/api/v1/requests", &app.customer_token()).await).await;
    let ids: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec![finished.as_str(), older.as_str()]);
}

#[tokio::test]
async fn empty_dashboard_shows_onboarding_progress() {
    let app = build_test_app().await;
    let json = body_json(
        get_auth(&app, "/api/v1/requests/dashboard", &app.customer_token()).await,
    )
    .await;
    assert!(json["data"]["current"].is_null());
    assert_eq!(json["data"]["progress"], 10);
    assert_eq!(json["data"]["total_requests"], 0);
}

#[tokio::test]
async fn dashboard_counts_requests_awaiting_payment() {
    let app = build_test_app().await;
    let id = submit(&app).await;
    submit(&app).await;
    attach(&app, &id).await;

    let json = body_json(
        get_auth(&app, "/api/v1/requests/dashboard", &app.customer_token()).await,
    )
    .await;
    assert_eq!(json["data"]["current"]["id"], id);
    assert_eq!(json["data"]["progress"], 100);
    assert_eq!(json["data"]["total_requests"], 2);
    assert_eq!(json["data"]["awaiting_payment"], 1);
}
