//! Authorization server integration.
//!
//! The provider never decides on its own whether a challenge is valid; every
//! lookup and every decision goes through the admin API described by [`AdminApi`].
//!
//! ## Admin endpoints used
//!
//! - `GET  /oauth2/auth/requests/login` / `PUT .../login/accept`
//! - `GET  /oauth2/auth/requests/consent` / `PUT .../consent/accept`
//! - `POST /clients`
//! - `GET  /health/ready` (public endpoint)

mod client;
pub mod models;

pub use client::HydraAdminClient;
pub use models::{
    AcceptConsentRequest, AcceptLoginRequest, ChallengeContext, ChallengeKind, ClientDefinition,
    CompletedRequest, OAuthClient,
};

use crate::error::UpstreamError;
use std::future::Future;

/// Operations the provider needs from the authorization server.
pub trait AdminApi: Send + Sync + 'static {
    fn get_login_request(
        &self,
        challenge: &str,
    ) -> impl Future<Output = Result<ChallengeContext, UpstreamError>> + Send;

    fn accept_login_request(
        &self,
        challenge: &str,
        body: &AcceptLoginRequest,
    ) -> impl Future<Output = Result<CompletedRequest, UpstreamError>> + Send;

    fn get_consent_request(
        &self,
        challenge: &str,
    ) -> impl Future<Output = Result<ChallengeContext, UpstreamError>> + Send;

    fn accept_consent_request(
        &self,
        challenge: &str,
        body: &AcceptConsentRequest,
    ) -> impl Future<Output = Result<CompletedRequest, UpstreamError>> + Send;

    /// Succeeds once the server reports itself ready.
    fn probe_ready(&self) -> impl Future<Output = Result<(), UpstreamError>> + Send;

    /// Registers a client; anything but `201 Created` is an error.
    fn create_client(
        &self,
        client: &ClientDefinition,
    ) -> impl Future<Output = Result<(), UpstreamError>> + Send;
}
