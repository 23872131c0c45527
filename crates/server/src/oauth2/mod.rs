//! Login and consent provider.
//!
//! The pages here are the user-facing half of an OAuth2/OIDC authorization
//! server that delegates authentication and consent. The server redirects the
//! browser here with a challenge; the provider decides and hands the browser back.
//!
//! ## Endpoints
//!
//! - `GET /login` / `POST /login` - Login form and credential check
//! - `GET /consent` / `POST /consent` - Consent prompt and grant
//! - `GET /error` - Error page for protocol errors

pub mod claims;
pub mod consent;
pub mod error_page;
pub mod login;
pub mod password;
pub mod redirect;
pub mod resolver;
mod state;
pub mod views;

pub use claims::SessionClaims;
pub use redirect::{RedirectRewriter, rewrite_redirect};
pub use resolver::{ChallengeResolver, ConsentPrompt, ConsentStep, LoginStep};
pub use state::OAuth2State;

use crate::hydra::AdminApi;
use utoipa_axum::{router::OpenApiRouter, routes};

/// OpenAPI tag for login and consent endpoints
pub const OAUTH2_TAG: &str = "OAuth2";

/// Creates the login, consent and error page router.
pub fn router<A: AdminApi>(state: OAuth2State<A>) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(login::login_page, login::login_submit))
        .routes(routes!(consent::consent_page, consent::consent_submit))
        .routes(routes!(error_page::error_page))
        .with_state(state)
}
