//! Integration tests driving the API over in-process HTTP.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use persistence::MemoryStore;
use wardops_api::app::create_app;
use wardops_api::config::{Config, SeedSite};
use wardops_api::middleware::build_verifier;
use wardops_api::services::notifier::build_notifier;
use wardops_api::{bootstrap, routes};

const TOKEN: &str = "test-token";
const SITE_DB: &str = "ward-north";

async fn test_app() -> Router {
    let mut config = Config::load_for_test(&[]).expect("Failed to load config");
    config.store.sites = vec![SeedSite {
        db: SITE_DB.to_string(),
        label: "North wing".to_string(),
    }];

    let store = MemoryStore::new(config.store.registry_db.clone());
    bootstrap::seed(&store, &config).await.expect("seed failed");

    let verifier = build_verifier(&config.auth).expect("verifier");
    let notifier = build_notifier(&config.notifications);
    create_app(config, store, verifier, notifier, None)
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {TOKEN}"))
        .header("x-site", SITE_DB);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn bed(label: &str) -> Value {
    json!({
        "id": uuid::Uuid::new_v4(),
        "label": label,
        "type": "bed",
        "section": {"id": uuid::Uuid::new_v4(), "floorId": uuid::Uuid::new_v4()}
    })
}

#[tokio::test]
async fn missing_token_is_rejected() {
    let app = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/floors")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn health_is_public() {
    let app = test_app().await;
    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/health/live")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unknown_site_header_is_not_found() {
    let app = test_app().await;
    let mut req = request("GET", "/api/v1/floors", None);
    req.headers_mut()
        .insert("x-site", "nowhere".parse().unwrap());
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn bearer_lifecycle_reaches_the_search_feed() {
    let app = test_app().await;

    // create
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/v1/bearer/requests",
            Some(json!({
                "from": bed("204-A"),
                "to": bed("Radiology"),
                "requestedOn": "2024-03-01T10:00:00Z",
                "options": []
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created = json_body(response).await;
    let id = created["id"].as_str().unwrap().to_string();

    // accept
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/v1/bearer/requests/accept",
            Some(json!({
                "requestId": id,
                "userId": uuid::Uuid::new_v4(),
                "userLabel": "Alex Tremblay",
                "assignedOn": "2024-03-01T10:05:00Z"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // complete
    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/api/v1/bearer/requests/completed",
            Some(json!({
                "requestId": id,
                "completedOn": "2024-03-01T10:30:00Z"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // search the completion window
    let response = app
        .oneshot(request(
            "POST",
            "/api/v1/requests/search",
            Some(json!({
                "fromDate": "2024-03-01T00:00:00Z",
                "toDate": "2024-03-02T00:00:00Z",
                "searchBearer": true,
                "searchCleaner": true,
                "searchVisitor": true
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let events = json_body(response).await;
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["id"].as_str().unwrap(), id);
    assert_eq!(events[0]["type"], "bearer");
    let labels: Vec<&str> = events[0]["options"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, ["Transport from", "To", "Bearer"]);
}

#[tokio::test]
async fn multi_site_search_requires_sites() {
    let app = test_app().await;
    let response = app
        .oneshot(request(
            "POST",
            "/api/v1/requests/search/sites",
            Some(json!({
                "siteIds": [],
                "fromDate": "2024-03-01T00:00:00Z",
                "toDate": "2024-03-02T00:00:00Z",
                "searchBearer": true
            })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn kiosk_check_in_enforces_rotated_key() {
    let app = test_app().await;

    let check_in_body = || {
        Some(json!({
            "requestFor": bed("204-A"),
            "requestedOn": "2024-03-01T14:00:00Z",
            "options": []
        }))
    };

    // no key configured yet: open check-in, mirroring a fresh site
    let response = app
        .clone()
        .oneshot(request("PUT", "/api/v1/visitor/check-in", check_in_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // rotate the kiosk key (staff operation)
    let response = app
        .clone()
        .oneshot(request("POST", "/api/v1/visitor/settings/kiosk-key", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let key = json_body(response).await["key"].as_str().unwrap().to_string();

    // without the key the kiosk is now rejected
    let response = app
        .clone()
        .oneshot(request("PUT", "/api/v1/visitor/check-in", check_in_body()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // with the key it goes through
    let mut req = request("PUT", "/api/v1/visitor/check-in", check_in_body());
    req.headers_mut().insert(
        routes::requests::KIOSK_KEY_HEADER,
        key.parse().unwrap(),
    );
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
