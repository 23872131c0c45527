//! Minimal OAuth2 client for trying the provider end to end.
//!
//! `GET /` links to the authorization endpoint with a fresh `state`;
//! `GET /callback` checks the state, exchanges the code and shows the tokens.

use crate::config::DemoClientConfig;
use crate::error::UpstreamError;
use crate::http::HttpClient;
use crate::oauth2::views::render;
use crate::state_store::StateStore;
use askama::Template;
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

const NOT_AVAILABLE: &str = "n.a.";

#[derive(Clone)]
pub struct DemoClientState {
    pub config: Arc<DemoClientConfig>,
    pub states: Arc<StateStore>,
    pub http: HttpClient,
}

impl DemoClientState {
    pub fn new(config: DemoClientConfig) -> Result<Self, UpstreamError> {
        let http = HttpClient::new(config.skip_tls_verify)?;
        let states = StateStore::new(
            Duration::from_secs(config.state_ttl_secs),
            config.state_capacity,
        );
        Ok(Self {
            config: Arc::new(config),
            states: Arc::new(states),
            http,
        })
    }
}

/// Token endpoint answer; only the fields the welcome page shows.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub id_token: Option<String>,
}

#[derive(Template)]
#[template(path = "client_index.html")]
struct IndexTemplate {
    login_url: String,
}

#[derive(Template)]
#[template(path = "client_welcome.html")]
struct WelcomeTemplate {
    access_token: String,
    token_type: String,
    refresh_token: String,
    expires_in: String,
    id_token: String,
}

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// Authorization code request URL for `state`.
pub fn authorization_url(config: &DemoClientConfig, state: &str) -> String {
    let separator = if config.auth_url.contains('?') { '&' } else { '?' };
    format!(
        "{}{separator}response_type=code&client_id={}&redirect_uri={}&scope={}&state={}",
        config.auth_url,
        urlencoding::encode(&config.client_id),
        urlencoding::encode(&config.redirect_url),
        urlencoding::encode(&config.scope),
        urlencoding::encode(state),
    )
}

/// `Authorization` header value for client_secret_basic (RFC 6749, section 2.3.1).
pub fn basic_auth(client_id: &str, client_secret: &str) -> String {
    let credentials = format!(
        "{}:{}",
        urlencoding::encode(client_id),
        urlencoding::encode(client_secret)
    );
    format!("Basic {}", STANDARD.encode(credentials))
}

#[tracing::instrument(skip(http, config, code))]
pub async fn exchange_code(
    http: &HttpClient,
    config: &DemoClientConfig,
    code: &str,
) -> Result<TokenResponse, UpstreamError> {
    let authorization = basic_auth(&config.client_id, &config.client_secret);
    let resp = http
        .post_form(
            &config.token_url,
            &[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", &config.redirect_url),
            ],
            Some(&authorization),
        )
        .await?;

    if !resp.status.is_success() {
        return Err(UpstreamError::Http {
            status: resp.status,
            context: resp.context(),
        });
    }
    serde_json::from_slice(&resp.body).map_err(|e| UpstreamError::Json(e.to_string()))
}

pub fn router(state: DemoClientState) -> Router {
    Router::new()
        .route("/", get(homepage))
        .route("/callback", get(callback))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

#[tracing::instrument(skip(state))]
async fn homepage(State(state): State<DemoClientState>) -> Response {
    let issued = match state.states.issue() {
        Ok(issued) => issued,
        Err(e) => {
            tracing::error!("Failed to generate state: {}", e);
            return (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response();
        }
    };
    let login_url = authorization_url(&state.config, &issued);
    render(&IndexTemplate { login_url }, StatusCode::OK)
}

#[tracing::instrument(skip(state, params))]
async fn callback(
    State(state): State<DemoClientState>,
    Query(params): Query<CallbackQuery>,
) -> Response {
    if let Some(error) = params.error {
        tracing::info!(%error, "authorization was not granted");
        let description = params.error_description.unwrap_or_default();
        return (
            StatusCode::BAD_REQUEST,
            format!("authorization failed: {error} {description}"),
        )
            .into_response();
    }

    let known = params
        .state
        .as_deref()
        .is_some_and(|s| state.states.consume(s));
    if !known {
        tracing::info!("unknown or expired state");
        return (StatusCode::BAD_REQUEST, "state must be set").into_response();
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "code must be set").into_response();
    };

    let token = match exchange_code(&state.http, &state.config, &code).await {
        Ok(token) => token,
        Err(e) => {
            tracing::warn!(error = %e, "code exchange failed");
            return (
                StatusCode::BAD_GATEWAY,
                format!("error on getting access token due to {e}"),
            )
                .into_response();
        }
    };

    if token.id_token.is_none() {
        tracing::info!("token response carries no id_token");
    }

    render(
        &WelcomeTemplate {
            access_token: token.access_token,
            token_type: token.token_type,
            refresh_token: token
                .refresh_token
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            expires_in: token
                .expires_in
                .map(|s| s.to_string())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            id_token: token.id_token.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
        },
        StatusCode::OK,
    )
}
