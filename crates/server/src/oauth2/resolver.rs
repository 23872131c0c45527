//! Login and consent decisions.
//!
//! Each challenge goes through the same steps: the context is fetched from the
//! authorization server, a `skip` flag short-circuits straight to an accept call,
//! otherwise the user is asked. Accepting always ends in a redirect to the URL the
//! server hands back, passed through the [`RedirectRewriter`].

use crate::error::ResolveError;
use crate::hydra::{
    AcceptConsentRequest, AcceptLoginRequest, AdminApi, ChallengeContext, ChallengeKind,
};
use crate::oauth2::claims::SessionClaims;
use crate::oauth2::redirect::RedirectRewriter;
use crate::users::UserDirectory;
use std::sync::Arc;

/// Outcome of looking at a login challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginStep {
    /// Accepted without interaction; continue at this URL.
    Redirect(String),
    /// The user has to enter credentials for this challenge.
    AwaitingCredentials { challenge: String },
}

/// What the consent page shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsentPrompt {
    pub challenge: String,
    pub client_name: String,
    pub requested_scope: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentStep {
    Redirect(String),
    AwaitingDecision(ConsentPrompt),
}

pub struct ChallengeResolver<A> {
    admin: A,
    users: Arc<UserDirectory>,
    rewriter: RedirectRewriter,
}

fn require_challenge(kind: ChallengeKind, challenge: &str) -> Result<&str, ResolveError> {
    let challenge = challenge.trim();
    if challenge.is_empty() {
        return Err(ResolveError::MissingChallenge(kind));
    }
    Ok(challenge)
}

impl<A: AdminApi> ChallengeResolver<A> {
    pub fn new(admin: A, users: Arc<UserDirectory>, rewriter: RedirectRewriter) -> Self {
        Self {
            admin,
            users,
            rewriter,
        }
    }

    pub fn admin(&self) -> &A {
        &self.admin
    }

    pub fn users(&self) -> &UserDirectory {
        &self.users
    }

    #[tracing::instrument(skip(self, challenge))]
    pub async fn resolve_login(&self, challenge: &str) -> Result<LoginStep, ResolveError> {
        let challenge = require_challenge(ChallengeKind::Login, challenge)?;
        let context = self.admin.get_login_request(challenge).await?;

        if !context.skip {
            return Ok(LoginStep::AwaitingCredentials {
                challenge: challenge.to_string(),
            });
        }

        tracing::info!(subject = %context.subject, "login skipped, accepting existing session");
        let body = AcceptLoginRequest {
            subject: context.subject,
            remember: true,
        };
        let completed = self.admin.accept_login_request(challenge, &body).await?;
        Ok(LoginStep::Redirect(self.rewriter.rewrite(&completed.redirect_to)))
    }

    /// Checks the credentials and accepts the challenge with `subject = email`.
    ///
    /// The challenge is looked up once more before accepting so an unknown or
    /// already used challenge is reported as such instead of as a failed accept.
    #[tracing::instrument(skip(self, challenge, password))]
    pub async fn complete_login(
        &self,
        challenge: &str,
        email: &str,
        password: &str,
        remember: bool,
    ) -> Result<String, ResolveError> {
        let challenge = require_challenge(ChallengeKind::Login, challenge)?;

        if !self.users.verify_credentials(email, password) {
            tracing::info!("rejected credentials");
            return Err(ResolveError::InvalidCredentials);
        }

        self.admin.get_login_request(challenge).await?;

        let body = AcceptLoginRequest {
            subject: email.to_string(),
            remember,
        };
        let completed = self.admin.accept_login_request(challenge, &body).await?;
        tracing::info!("login accepted");
        Ok(self.rewriter.rewrite(&completed.redirect_to))
    }

    #[tracing::instrument(skip(self, challenge))]
    pub async fn resolve_consent(&self, challenge: &str) -> Result<ConsentStep, ResolveError> {
        let challenge = require_challenge(ChallengeKind::Consent, challenge)?;
        let context = self.admin.get_consent_request(challenge).await?;
        let session = self.session_for(&context.subject)?;

        if context.skip {
            tracing::info!(subject = %context.subject, "consent skipped, granting requested scope");
            let redirect = self.accept_consent(challenge, context, session).await?;
            return Ok(ConsentStep::Redirect(redirect));
        }

        Ok(ConsentStep::AwaitingDecision(ConsentPrompt {
            challenge: challenge.to_string(),
            client_name: context.client.display_name().to_string(),
            requested_scope: context.requested_scope,
        }))
    }

    /// Grants everything the client asked for.
    ///
    /// Scope and audience are fetched again rather than taken from the form.
    /// Selecting a subset of scopes on the consent page is not supported.
    #[tracing::instrument(skip(self, challenge))]
    pub async fn complete_consent(&self, challenge: &str) -> Result<String, ResolveError> {
        let challenge = require_challenge(ChallengeKind::Consent, challenge)?;
        let context = self.admin.get_consent_request(challenge).await?;
        let session = self.session_for(&context.subject)?;
        self.accept_consent(challenge, context, session).await
    }

    fn session_for(&self, subject: &str) -> Result<SessionClaims, ResolveError> {
        let user = self
            .users
            .get_by_email(subject)
            .map_err(|source| ResolveError::UserLookupFailed {
                subject: subject.to_string(),
                source,
            })?;
        Ok(SessionClaims::for_user(&user))
    }

    async fn accept_consent(
        &self,
        challenge: &str,
        context: ChallengeContext,
        session: SessionClaims,
    ) -> Result<String, ResolveError> {
        let body = AcceptConsentRequest {
            grant_scope: context.requested_scope,
            grant_access_token_audience: context.requested_access_token_audience,
            remember: true,
            session,
        };
        let completed = self.admin.accept_consent_request(challenge, &body).await?;
        Ok(self.rewriter.rewrite(&completed.redirect_to))
    }
}
