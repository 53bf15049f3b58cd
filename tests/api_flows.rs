//! End-to-end API flow tests.
//!
//! Each test drives the axum router against a fresh SQLite database in a
//! temporary directory:
//! 1. Team setup and lookup
//! 2. PR creation with reviewer selection
//! 3. Merge idempotence and the merged-PR freeze
//! 4. Reassignment outcomes
//! 5. Error envelope for malformed requests

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use pr_reviewer::config::{DatabaseConfig, ReviewConfig};
use pr_reviewer::services::http_api;
use pr_reviewer::services::ReviewService;
use serde_json::{json, Value};
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

async fn setup() -> (Router, TempDir) {
    let dir = tempdir().unwrap();
    let config = DatabaseConfig {
        path: dir.path().join("api.db"),
        ..DatabaseConfig::default()
    };
    let pool = pr_reviewer::db::initialize(&config).await.unwrap();
    let service = ReviewService::new(pool, &ReviewConfig::default());
    (http_api::router(service), dir)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn post(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

/// Team "core": A, B, C active and D inactive.
async fn add_core_team(app: &Router) {
    let (status, _) = post(
        app,
        "/team/add",
        json!({
            "team_name": "core",
            "members": [
                {"user_id": "A", "username": "Alice", "is_active": true},
                {"user_id": "B", "username": "Bob", "is_active": true},
                {"user_id": "C", "username": "Carol", "is_active": true},
                {"user_id": "D", "username": "Dave", "is_active": false},
            ]
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

async fn create_pr(app: &Router, id: &str, author: &str) -> (StatusCode, Value) {
    post(
        app,
        "/pullRequest/create",
        json!({
            "pull_request_id": id,
            "pull_request_name": format!("Change {}", id),
            "author_id": author,
        }),
    )
    .await
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap()
}

#[tokio::test]
async fn test_health() {
    let (app, _dir) = setup().await;

    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_team_add_and_get() {
    let (app, _dir) = setup().await;
    add_core_team(&app).await;

    let (status, body) = get(&app, "/team/get?team_name=core").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["team_name"], "core");
    let members = body["members"].as_array().unwrap();
    assert_eq!(members.len(), 4);
    assert_eq!(members[0]["user_id"], "A");
    assert_eq!(members[3]["is_active"], false);

    let (status, body) = post(&app, "/team/add", json!({"team_name": "core", "members": []})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "TEAM_EXISTS");

    let (status, body) = get(&app, "/team/get?team_name=ghost").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn test_create_pr_assigns_two_teammates() {
    let (app, _dir) = setup().await;
    add_core_team(&app).await;

    let (status, body) = create_pr(&app, "pr-1", "A").await;
    assert_eq!(status, StatusCode::CREATED);

    let pr = &body["pr"];
    assert_eq!(pr["status"], "OPEN");
    assert_eq!(pr["author_id"], "A");
    assert_eq!(pr["assigned_reviewers"], json!(["B", "C"]));
    assert!(pr["createdAt"].is_string());
    assert!(pr["mergedAt"].is_null());

    let (status, body) = create_pr(&app, "pr-1", "B").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "PR_EXISTS");

    let (status, body) = create_pr(&app, "pr-2", "nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn test_create_pr_without_teammates() {
    let (app, _dir) = setup().await;
    post(
        &app,
        "/team/add",
        json!({
            "team_name": "solo",
            "members": [{"user_id": "S", "username": "Sam", "is_active": true}]
        }),
    )
    .await;

    let (status, body) = create_pr(&app, "pr-1", "S").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["pr"]["assigned_reviewers"], json!([]));
}

#[tokio::test]
async fn test_merge_twice_is_identical() {
    let (app, _dir) = setup().await;
    add_core_team(&app).await;
    create_pr(&app, "pr-1", "A").await;

    let (status, first) = post(&app, "/pullRequest/merge", json!({"pull_request_id": "pr-1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["pr"]["status"], "MERGED");
    assert!(first["pr"]["mergedAt"].is_string());

    let (status, second) = post(&app, "/pullRequest/merge", json!({"pull_request_id": "pr-1"})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["pr"]["status"], second["pr"]["status"]);
    assert_eq!(first["pr"]["mergedAt"], second["pr"]["mergedAt"]);

    let (status, body) = post(&app, "/pullRequest/merge", json!({"pull_request_id": "pr-9"})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn test_reassign_flow() {
    let (app, _dir) = setup().await;
    add_core_team(&app).await;
    create_pr(&app, "pr-1", "A").await;

    // D is the only other member and is inactive
    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "pr-1", "old_user_id": "B"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "NO_CANDIDATE");

    let (status, body) = post(&app, "/users/setIsActive", json!({"user_id": "D", "is_active": true})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["is_active"], true);
    assert_eq!(body["user"]["team_name"], "core");

    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "pr-1", "old_user_id": "B"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["replaced_by"], "D");
    assert_eq!(body["pr"]["assigned_reviewers"], json!(["C", "D"]));

    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "pr-1", "old_user_id": "B"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "NOT_ASSIGNED");

    post(&app, "/pullRequest/merge", json!({"pull_request_id": "pr-1"})).await;
    let (status, body) = post(
        &app,
        "/pullRequest/reassign",
        json!({"pull_request_id": "pr-1", "old_user_id": "C"}),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "PR_MERGED");

    let (_, body) = get(&app, "/team/get?team_name=core").await;
    assert_eq!(body["members"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn test_get_review_lists_assignments() {
    let (app, _dir) = setup().await;
    add_core_team(&app).await;
    create_pr(&app, "pr-1", "A").await;
    create_pr(&app, "pr-2", "C").await;

    let (status, body) = get(&app, "/users/getReview?user_id=B").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], "B");
    let prs = body["pull_requests"].as_array().unwrap();
    let ids: Vec<&str> = prs
        .iter()
        .map(|p| p["pull_request_id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["pr-1", "pr-2"]);
    assert_eq!(prs[0]["status"], "OPEN");
    assert!(prs[0].get("assigned_reviewers").is_none());

    let (status, body) = get(&app, "/users/getReview?user_id=D").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pull_requests"], json!([]));

    let (status, body) = get(&app, "/users/getReview?user_id=nobody").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn test_set_is_active_unknown_user() {
    let (app, _dir) = setup().await;

    let (status, body) = post(&app, "/users/setIsActive", json!({"user_id": "ghost", "is_active": false})).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_requests() {
    let (app, _dir) = setup().await;

    let request = Request::builder()
        .method("POST")
        .uri("/team/add")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "NOT_FOUND");
    assert!(body["error"]["message"].is_string());

    let (status, body) = post(&app, "/pullRequest/create", json!({"pull_request_id": "pr-1"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "NOT_FOUND");

    let (status, body) = get(&app, "/team/get").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "NOT_FOUND");

    let (status, body) = post(
        &app,
        "/team/add",
        json!({"team_name": "", "members": []}),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "NOT_FOUND");
}
