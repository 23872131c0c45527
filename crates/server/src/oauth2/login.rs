//! Login endpoints.
//!
//! - Login page (GET): auto-accepts remembered sessions, otherwise shows the form
//! - Login submission (POST): checks the credentials and accepts the challenge

use crate::error::ResolveError;
use crate::hydra::AdminApi;
use crate::oauth2::resolver::LoginStep;
use crate::oauth2::state::OAuth2State;
use crate::oauth2::views::{LoginTemplate, error_response, render};
use axum::{
    Form,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

/// Query parameters for the login page.
#[derive(Debug, Deserialize, IntoParams)]
pub struct LoginQuery {
    /// Challenge issued by the authorization server.
    pub login_challenge: Option<String>,
}

/// Form data for login submission.
#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginForm {
    #[serde(default)]
    pub login_challenge: String,
    /// Email address of the user.
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    /// `on` when the "remember me" box is ticked.
    pub remember: Option<String>,
}

impl LoginForm {
    fn remember(&self) -> bool {
        self.remember.as_deref() == Some("on")
    }
}

/// Display the login page.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/login",
    tag = super::OAUTH2_TAG,
    operation_id = "Login Page",
    summary = "Display the login page",
    description = "Looks up the login challenge at the authorization server. If the user already has a \
                   remembered session the challenge is accepted right away and the browser is redirected; \
                   otherwise the login form is rendered.",
    params(LoginQuery),
    responses(
        (status = 200, description = "Login page HTML"),
        (status = 303, description = "Challenge accepted, continue at the authorization server"),
        (status = 400, description = "Missing or unknown challenge"),
        (status = 502, description = "Authorization server unavailable"),
    )
)]
pub async fn login_page<A: AdminApi>(
    State(state): State<OAuth2State<A>>,
    Query(params): Query<LoginQuery>,
) -> Response {
    let challenge = params.login_challenge.unwrap_or_default();
    match state.resolver.resolve_login(&challenge).await {
        Ok(LoginStep::Redirect(url)) => Redirect::to(&url).into_response(),
        Ok(LoginStep::AwaitingCredentials { challenge }) => render(
            &LoginTemplate::new(&state.base_path, &challenge),
            StatusCode::OK,
        ),
        Err(e) => error_response(&state.base_path, &e),
    }
}

/// Handle login form submission.
#[tracing::instrument(skip(state, form), fields(username = %form.username))]
#[utoipa::path(
    post,
    path = "/login",
    tag = super::OAUTH2_TAG,
    operation_id = "Login Submit",
    summary = "Submit login credentials",
    description = "Checks username and password against the user directory. On success the login challenge \
                   is accepted with the username as subject and the browser is redirected back to the \
                   authorization server. Wrong credentials re-render the form.",
    request_body(
        content = LoginForm,
        content_type = "application/x-www-form-urlencoded",
        description = "Login challenge and credentials"
    ),
    responses(
        (status = 303, description = "Challenge accepted, continue at the authorization server"),
        (status = 400, description = "Missing or unknown challenge"),
        (status = 401, description = "Wrong username or password, login page HTML"),
        (status = 502, description = "Authorization server unavailable"),
    )
)]
pub async fn login_submit<A: AdminApi>(
    State(state): State<OAuth2State<A>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let result = state
        .resolver
        .complete_login(
            &form.login_challenge,
            form.username.trim(),
            &form.password,
            form.remember(),
        )
        .await;

    match result {
        Ok(url) => Redirect::to(&url).into_response(),
        Err(ResolveError::InvalidCredentials) => render(
            &LoginTemplate::new(&state.base_path, &form.login_challenge)
                .with_error("Wrong username or password", "Please correct your input."),
            StatusCode::UNAUTHORIZED,
        ),
        Err(e) => error_response(&state.base_path, &e),
    }
}
