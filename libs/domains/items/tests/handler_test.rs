//! Handler tests for the Items domain
//!
//! These drive the domain router directly over an in-memory repository:
//! - Request deserialization and validation
//! - Response serialization and status codes
//! - Events published for each mutation
//!
//! Key casing and authentication are applied by the application, so bodies
//! here are snake_case and carry no credentials.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain_items::events::{ITEM_CREATED, ITEM_DELETED, ITEM_UPDATED};
use domain_items::*;
use http_body_util::BodyExt;
use messaging::{DispatchMode, EventBus, RecordingHandler};
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

struct TestApp {
    router: Router,
    repository: Arc<InMemoryItemRepository>,
    events: Arc<RecordingHandler>,
}

fn test_app() -> TestApp {
    let bus = Arc::new(EventBus::with_mode(DispatchMode::Inline));
    let events = Arc::new(RecordingHandler::new());
    for topic in [ITEM_CREATED, ITEM_UPDATED, ITEM_DELETED] {
        bus.subscribe(topic, events.clone());
    }

    let repository = Arc::new(InMemoryItemRepository::new());
    let service = ItemService::new(repository.clone(), bus);

    TestApp {
        router: handlers::router(service),
        repository,
        events,
    }
}

// Helper to parse JSON response body
async fn json_body<T: serde::de::DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn seed(app: &TestApp, name: &str, zip_code: Option<&str>) -> Item {
    app.repository
        .create(CreateItem {
            name: name.to_string(),
            zip_code: zip_code.map(str::to_string),
            ..Default::default()
        })
        .await
        .unwrap()
}

#[tokio::test]
async fn test_create_item_returns_201_without_geolocation() {
    let app = test_app();

    let request = json_request(
        "POST",
        "/",
        json!({
            "name": "Coffee Maker",
            "description": "Drip brewer",
            "zip_code": "10001",
            "attributes": { "color": "black", "cups": 12 }
        }),
    );
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);

    let item: Item = json_body(response.into_body()).await;
    assert_eq!(item.name, "Coffee Maker");
    assert_eq!(item.zip_code.as_deref(), Some("10001"));
    assert_eq!(item.attributes["cups"], AttributeValue::Integer(12));
    assert!(item.geolocation.is_none());

    let events = app.events.received();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].topic, ITEM_CREATED);
    assert_eq!(events[0].payload["item_id"], item.id.to_string());
    assert_eq!(events[0].payload["zip_code"], "10001");
}

#[tokio::test]
async fn test_create_item_rejects_bad_zip_code() {
    let app = test_app();

    let request = json_request("POST", "/", json!({ "name": "Lamp", "zip_code": "1234" }));
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"]["zip_code"].is_array());

    assert!(app.repository.is_empty().await);
    assert_eq!(app.events.count(), 0);
}

#[tokio::test]
async fn test_create_item_rejects_long_name() {
    let app = test_app();

    let request = json_request("POST", "/", json!({ "name": "x".repeat(51) }));
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert!(body["details"]["name"].is_array());
}

#[tokio::test]
async fn test_create_item_rejects_nested_attribute() {
    let app = test_app();

    let request = json_request(
        "POST",
        "/",
        json!({ "name": "Lamp", "attributes": { "dims": { "w": 1 } } }),
    );
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
    assert!(app.repository.is_empty().await);
}

#[tokio::test]
async fn test_get_item_returns_stored_item() {
    let app = test_app();
    let item = seed(&app, "Kettle", None).await;

    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", &format!("/{}", item.id)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let found: Item = json_body(response.into_body()).await;
    assert_eq!(found, item);
}

#[tokio::test]
async fn test_get_missing_item_returns_404() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", &format!("/{}", uuid::Uuid::now_v7())))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_get_item_with_malformed_id_returns_400() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", "/not-a-uuid"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = json_body(response.into_body()).await;
    assert_eq!(body["error"], "INVALID_UUID");
}

#[tokio::test]
async fn test_list_items_filters_and_pages() {
    let app = test_app();
    let first = seed(&app, "Red Chair", Some("10001")).await;
    let second = seed(&app, "Blue Chair", Some("90210")).await;
    let third = seed(&app, "Red Table", Some("10001")).await;

    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", "/"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let all: Vec<Item> = json_body(response.into_body()).await;
    let ids: Vec<_> = all.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![third.id, second.id, first.id]);

    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", "/?search=red&zip_code=10001&limit=1"))
        .await
        .unwrap();
    let page: Vec<Item> = json_body(response.into_body()).await;
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, third.id);

    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", "/?search=chair&offset=1"))
        .await
        .unwrap();
    let page: Vec<Item> = json_body(response.into_body()).await;
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, first.id);
}

#[tokio::test]
async fn test_list_items_rejects_limit_out_of_range() {
    let app = test_app();

    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", "/?limit=1000"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_patch_item_updates_supplied_fields() {
    let app = test_app();
    let item = seed(&app, "Lamp", Some("10001")).await;

    let request = json_request(
        "PATCH",
        &format!("/{}", item.id),
        json!({ "description": "Brass desk lamp" }),
    );
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let updated: Item = json_body(response.into_body()).await;
    assert_eq!(updated.name, "Lamp");
    assert_eq!(updated.description.as_deref(), Some("Brass desk lamp"));
    assert_eq!(updated.zip_code.as_deref(), Some("10001"));
    assert!(updated.updated_at >= item.updated_at);

    let events = app.events.received();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].topic, ITEM_UPDATED);
    assert_eq!(events[0].payload["changed_fields"], json!(["description"]));
}

#[tokio::test]
async fn test_patch_item_with_null_description_clears_it() {
    let app = test_app();
    let item = app
        .repository
        .create(CreateItem {
            name: "Lamp".into(),
            description: Some("Desk lamp".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    let request = json_request(
        "PATCH",
        &format!("/{}", item.id),
        json!({ "description": null }),
    );
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let updated: Item = json_body(response.into_body()).await;
    assert_eq!(updated.description, None);
    assert_eq!(updated.name, "Lamp");
    assert_eq!(
        app.events.received()[0].payload["changed_fields"],
        json!(["description"])
    );
}

#[tokio::test]
async fn test_patch_item_with_empty_body_returns_400() {
    let app = test_app();
    let item = seed(&app, "Lamp", None).await;

    let request = json_request("PATCH", &format!("/{}", item.id), json!({}));
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.events.count(), 0);
}

#[tokio::test]
async fn test_patch_missing_item_returns_404() {
    let app = test_app();

    let request = json_request(
        "PATCH",
        &format!("/{}", uuid::Uuid::now_v7()),
        json!({ "name": "Ghost" }),
    );
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_item_returns_204_then_404() {
    let app = test_app();
    let item = seed(&app, "Lamp", None).await;
    let uri = format!("/{}", item.id);

    let response = app
        .router
        .clone()
        .oneshot(empty_request("DELETE", &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let events = app.events.received();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].topic, ITEM_DELETED);

    let response = app
        .router
        .clone()
        .oneshot(empty_request("DELETE", &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .router
        .clone()
        .oneshot(empty_request("GET", &uri))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
