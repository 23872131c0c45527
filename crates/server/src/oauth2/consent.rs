//! Consent endpoints.
//!
//! The GET page without a challenge renders a neutral landing page instead of an
//! error, so the route can be opened directly.

use crate::error::ResolveError;
use crate::hydra::AdminApi;
use crate::oauth2::resolver::ConsentStep;
use crate::oauth2::state::OAuth2State;
use crate::oauth2::views::{ConsentTemplate, error_response, render, scope_info};
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Deserialize, IntoParams)]
pub struct ConsentQuery {
    /// Challenge issued by the authorization server.
    pub consent_challenge: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ConsentForm {
    #[serde(default)]
    pub consent_challenge: String,
}

#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/consent",
    tag = super::OAUTH2_TAG,
    operation_id = "Consent Page",
    summary = "Display the consent page",
    description = "Shows which scopes the requesting application asks for. Previously granted consent is \
                   accepted right away and the browser is redirected.",
    params(ConsentQuery),
    responses(
        (status = 200, description = "Consent page HTML, or the landing page without a challenge"),
        (status = 303, description = "Consent accepted, continue at the authorization server"),
        (status = 400, description = "Unknown challenge or unknown subject"),
        (status = 502, description = "Authorization server unavailable"),
    )
)]
pub async fn consent_page<A: AdminApi>(
    State(state): State<OAuth2State<A>>,
    Query(params): Query<ConsentQuery>,
) -> Response {
    let challenge = params.consent_challenge.unwrap_or_default();
    match state.resolver.resolve_consent(&challenge).await {
        Ok(ConsentStep::Redirect(url)) => Redirect::to(&url).into_response(),
        Ok(ConsentStep::AwaitingDecision(prompt)) => render(
            &ConsentTemplate {
                base_path: state.base_path.clone(),
                consent_challenge: Some(prompt.challenge),
                client_name: prompt.client_name,
                scopes: prompt
                    .requested_scope
                    .iter()
                    .map(|s| scope_info(s))
                    .collect(),
            },
            StatusCode::OK,
        ),
        Err(ResolveError::MissingChallenge(_)) => {
            tracing::debug!("no consent challenge, rendering landing page");
            render(&ConsentTemplate::landing(&state.base_path), StatusCode::OK)
        }
        Err(e) => error_response(&state.base_path, &e),
    }
}

#[tracing::instrument(skip(state, form))]
#[utoipa::path(
    post,
    path = "/consent",
    tag = super::OAUTH2_TAG,
    operation_id = "Consent Submit",
    summary = "Grant consent",
    description = "Grants every scope and audience the application requested. Scope and audience are read \
                   from the authorization server again, never from the submitted form.",
    request_body(
        content = ConsentForm,
        content_type = "application/x-www-form-urlencoded",
        description = "Consent challenge"
    ),
    responses(
        (status = 303, description = "Consent accepted, continue at the authorization server"),
        (status = 400, description = "Missing or unknown challenge, or unknown subject"),
        (status = 502, description = "Authorization server unavailable"),
    )
)]
pub async fn consent_submit<A: AdminApi>(
    State(state): State<OAuth2State<A>>,
    Form(form): Form<ConsentForm>,
) -> Response {
    match state.resolver.complete_consent(&form.consent_challenge).await {
        Ok(url) => Redirect::to(&url).into_response(),
        Err(e) => error_response(&state.base_path, &e),
    }
}
