//! Error page the authorization server redirects to on protocol errors.

use crate::hydra::AdminApi;
use crate::oauth2::state::OAuth2State;
use crate::oauth2::views::{ErrorTemplate, render};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Response,
};
use serde::Deserialize;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
pub struct ErrorQuery {
    /// OAuth2 error code, e.g. `access_denied`.
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/error",
    tag = super::OAUTH2_TAG,
    operation_id = "Error Page",
    summary = "Display an OAuth2 error",
    params(ErrorQuery),
    responses(
        (status = 200, description = "Error page HTML"),
    )
)]
pub async fn error_page<A: AdminApi>(
    State(state): State<OAuth2State<A>>,
    Query(params): Query<ErrorQuery>,
) -> Response {
    let title = params.error.unwrap_or_else(|| "Unknown error".to_string());
    tracing::info!(error = %title, "authorization server reported an error");
    render(
        &ErrorTemplate {
            base_path: state.base_path.clone(),
            title,
            description: params.error_description.unwrap_or_default(),
        },
        StatusCode::OK,
    )
}
