//! Health check endpoint.

use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Tag for OpenAPI documentation.
pub const MISC_TAG: &str = "Miscellaneous";

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    #[schema(example = "OK")]
    pub status: &'static str,
}

/// Health check endpoint.
#[tracing::instrument()]
#[utoipa::path(
    get,
    path = "/health",
    tag = MISC_TAG,
    operation_id = "Health Check",
    summary = "Service health check",
    description = "Reports that the provider is up and serving pages. It does not check the authorization \
                   server; the login and consent pages do not depend on it being ready at startup.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthStatus, content_type = "application/json")
    )
)]
pub async fn health() -> Json<HealthStatus> {
    Json(HealthStatus { status: "OK" })
}
