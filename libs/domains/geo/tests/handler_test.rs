//! Handler tests for `POST /location` against a stubbed geocoding service.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    body::Body,
    extract::Path,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use domain_geo::{RetryingGeocoder, ZippopotamClient, handlers};
use http_body_util::BodyExt;
use resilience::{Backoff, RecordingSleeper};
use serde_json::{Value, json};
use tower::ServiceExt; // For oneshot()

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}/us")
}

async fn zippopotam(Path(zip): Path<String>) -> Response {
    match zip.as_str() {
        "10001" => Json(json!({
            "post code": "10001",
            "country": "United States",
            "places": [{
                "place name": "New York City",
                "longitude": "-73.9967",
                "state": "New York",
                "state abbreviation": "NY",
                "latitude": "40.7484"
            }]
        }))
        .into_response(),
        "20500" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => (StatusCode::NOT_FOUND, Json(json!({}))).into_response(),
    }
}

async fn app() -> Router {
    let base_url = spawn_stub(Router::new().route("/us/{zip}", get(zippopotam))).await;
    let geocoder = RetryingGeocoder::new(
        Arc::new(ZippopotamClient::new(base_url)),
        Backoff::new(2, Duration::from_millis(500)),
        Duration::from_secs(5),
    )
    .with_sleeper(Arc::new(RecordingSleeper::new()));

    handlers::router(Arc::new(geocoder))
}

// Helper to parse JSON response body
async fn json_body(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn lookup(postcode: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/location")
        .header("content-type", "application/json")
        .body(Body::from(json!({ "postcode": postcode }).to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_lookup_returns_geolocation() {
    let response = app().await.oneshot(lookup("10001")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["place_name"], "New York City");
    assert_eq!(body["state_abbreviation"], "NY");
    assert_eq!(body["direction_from_new_york"], "SE");
}

#[tokio::test]
async fn test_unknown_postcode_returns_404() {
    let response = app().await.oneshot(lookup("99999")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "NOT_FOUND");
}

#[tokio::test]
async fn test_failing_upstream_returns_502() {
    let response = app().await.oneshot(lookup("20500")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "EXTERNAL_SERVICE_ERROR");
}

#[tokio::test]
async fn test_malformed_postcode_returns_400() {
    let response = app().await.oneshot(lookup("12")).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response.into_body()).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(body["details"]["postcode"].is_array());
}
