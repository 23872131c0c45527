//! OpenAPI/Utoipa configuration.

use crate::api::health::MISC_TAG;
use crate::oauth2::OAUTH2_TAG;
use utoipa::OpenApi;

/// OpenAPI documentation configuration.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Login & Consent Provider",
        version = "1.0.0",
        description = "Login and consent pages for an OAuth2/OpenID Connect authorization server."
    ),
    tags(
        (name = MISC_TAG, description = "Miscellaneous endpoints"),
        (name = OAUTH2_TAG, description = "Login, consent and error pages")
    )
)]
pub struct ApiDoc;
