use std::sync::Arc;

use axum::{Json, Router, extract::State, routing::post};
use axum_helpers::{
    ValidatedJson,
    errors::responses::{
        BadGatewayResponse, BadRequestValidationResponse, InternalServerErrorResponse,
        NotFoundResponse,
    },
};
use domain_items::{Direction, Geolocation, models::is_us_zip_code};
use serde::{Deserialize, Serialize};
use utoipa::{OpenApi, ToSchema};
use validator::{Validate, ValidationError};

use crate::error::GeoError;
use crate::geocoder::RetryingGeocoder;

/// OpenAPI documentation for the Geo API
#[derive(OpenApi)]
#[openapi(
    paths(lookup_location),
    components(
        schemas(PostcodeRequest, Geolocation, Direction),
        responses(
            BadRequestValidationResponse,
            NotFoundResponse,
            BadGatewayResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Geo", description = "Postal code lookup")
    )
)]
pub struct ApiDoc;

fn validate_postcode(postcode: &str) -> Result<(), ValidationError> {
    if !is_us_zip_code(postcode.trim()) {
        return Err(ValidationError::new("postcode")
            .with_message("must be a US postal code (NNNNN or NNNNN-NNNN)".into()));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PostcodeRequest {
    #[validate(custom(function = "validate_postcode"))]
    #[schema(example = "10001")]
    pub postcode: String,
}

/// Geo router. Mount it under `/geo`.
pub fn router(geocoder: Arc<RetryingGeocoder>) -> Router {
    Router::new()
        .route("/location", post(lookup_location))
        .with_state(geocoder)
}

/// Look up a postal code
///
/// Uses the same retry policy as the background lookup.
#[utoipa::path(
    post,
    path = "/location",
    tag = "Geo",
    request_body = PostcodeRequest,
    responses(
        (status = 200, description = "Location found", body = Geolocation),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 502, response = BadGatewayResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn lookup_location(
    State(geocoder): State<Arc<RetryingGeocoder>>,
    ValidatedJson(request): ValidatedJson<PostcodeRequest>,
) -> Result<Json<Geolocation>, GeoError> {
    let geolocation = geocoder.geocode(&request.postcode).await?;
    Ok(Json(geolocation))
}
