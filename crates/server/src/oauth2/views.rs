//! HTML views of the login and consent flow.

use crate::error::ResolveError;
use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

/// Scope information for display.
#[derive(Debug, Clone)]
pub struct ScopeInfo {
    pub name: String,
    pub description: String,
}

/// Get human-readable scope information.
pub fn scope_info(scope: &str) -> ScopeInfo {
    let (name, description) = match scope {
        "openid" => ("OpenID", "Verify your identity"),
        "email" => ("Email", "Access your email address"),
        "profile" => ("Profile", "Access your profile information"),
        "offline" | "offline_access" => ("Offline access", "Stay signed in when you are not around"),
        _ => {
            return ScopeInfo {
                name: scope.to_string(),
                description: format!("Access to {}", scope),
            };
        }
    };
    ScopeInfo {
        name: name.to_string(),
        description: description.to_string(),
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub base_path: String,
    pub login_challenge: String,
    pub error_title: Option<String>,
    pub error_content: String,
}

impl LoginTemplate {
    pub fn new(base_path: &str, login_challenge: &str) -> Self {
        Self {
            base_path: base_path.to_string(),
            login_challenge: login_challenge.to_string(),
            error_title: None,
            error_content: String::new(),
        }
    }

    pub fn with_error(mut self, title: &str, content: &str) -> Self {
        self.error_title = Some(title.to_string());
        self.error_content = content.to_string();
        self
    }
}

/// Consent prompt. Without a challenge it doubles as a neutral landing page.
#[derive(Template)]
#[template(path = "consent.html")]
pub struct ConsentTemplate {
    pub base_path: String,
    pub consent_challenge: Option<String>,
    pub client_name: String,
    pub scopes: Vec<ScopeInfo>,
}

impl ConsentTemplate {
    pub fn landing(base_path: &str) -> Self {
        Self {
            base_path: base_path.to_string(),
            consent_challenge: None,
            client_name: String::new(),
            scopes: Vec::new(),
        }
    }
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub base_path: String,
    pub title: String,
    pub description: String,
}

/// Renders `template` with `status`, falling back to a plain 500 on failure.
pub fn render<T: Template>(template: &T, status: StatusCode) -> Response {
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => {
            tracing::error!("Failed to render template: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
        }
    }
}

/// Error page for a failed resolution, with the status derived from the error.
pub fn error_response(base_path: &str, err: &ResolveError) -> Response {
    let (title, description) = match err {
        ResolveError::MissingChallenge(kind) => (
            "Missing challenge".to_string(),
            format!("The {} must be passed as query parameter.", kind.param_name()),
        ),
        ResolveError::UpstreamUnavailable(_) | ResolveError::UpstreamRejected(_) => (
            "Could not continue the sign-in flow".to_string(),
            "Please start the sign-in again.".to_string(),
        ),
        ResolveError::UserLookupFailed { .. } => (
            "Unknown account".to_string(),
            "The account of this session could not be found.".to_string(),
        ),
        ResolveError::InvalidCredentials => (
            "Wrong username or password".to_string(),
            "Please correct your input.".to_string(),
        ),
    };

    match err {
        ResolveError::UpstreamUnavailable(e) => {
            tracing::error!(error = %e, "authorization server unavailable")
        }
        ResolveError::UpstreamRejected(e) => {
            tracing::warn!(error = %e, "authorization server rejected the request")
        }
        other => tracing::info!(error = %other, "request could not be resolved"),
    }

    render(
        &ErrorTemplate {
            base_path: base_path.to_string(),
            title,
            description,
        },
        err.status_code(),
    )
}
