use crate::hydra::ChallengeKind;
use hyper::StatusCode;
use std::time::Duration;
use thiserror::Error;

/// Failure of an outbound call to the authorization server.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("TLS error: {0}")]
    Tls(String),
    #[error("Network timeout after {0:?}")]
    Timeout(Duration),
    #[error("Network error: {0}")]
    Network(String),
    #[error("HTTP status {status}: {context}")]
    Http { status: StatusCode, context: String },
    #[error("JSON error: {0}")]
    Json(String),
}

impl UpstreamError {
    /// True when the server could not be reached or failed on its side.
    ///
    /// A 4xx answer means the server understood and refused the call (unknown or
    /// already used challenge, duplicate client) and is not counted here.
    pub fn is_unavailable(&self) -> bool {
        match self {
            UpstreamError::Http { status, .. } => !status.is_client_error(),
            _ => true,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            UpstreamError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum UserStoreError {
    #[error("User not found: {0}")]
    NotFound(String),
    #[error("User already exists: {0}")]
    AlreadyExists(String),
}

/// Outcome of a login or consent resolution that does not end in a redirect.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("{} parameter is missing", .0.param_name())]
    MissingChallenge(ChallengeKind),
    #[error("Authorization server unavailable: {0}")]
    UpstreamUnavailable(#[source] UpstreamError),
    #[error("Authorization server rejected the request: {0}")]
    UpstreamRejected(#[source] UpstreamError),
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("No user for subject {subject:?}")]
    UserLookupFailed {
        subject: String,
        #[source]
        source: UserStoreError,
    },
}

impl From<UpstreamError> for ResolveError {
    fn from(err: UpstreamError) -> Self {
        if err.is_unavailable() {
            ResolveError::UpstreamUnavailable(err)
        } else {
            ResolveError::UpstreamRejected(err)
        }
    }
}

impl ResolveError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ResolveError::MissingChallenge(_)
            | ResolveError::UpstreamRejected(_)
            | ResolveError::UserLookupFailed { .. } => StatusCode::BAD_REQUEST,
            ResolveError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
            ResolveError::InvalidCredentials => StatusCode::UNAUTHORIZED,
        }
    }
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("Authorization server not ready after {attempts} attempts")]
    Exhausted { attempts: u32 },
    #[error("Authorization server not ready within {0:?}")]
    TimedOut(Duration),
    #[error("Invalid client definitions: {0}")]
    InvalidPayload(String),
}
