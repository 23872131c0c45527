use hyper::StatusCode;
use login_consent_provider::error::{BootstrapError, ResolveError, UpstreamError, UserStoreError};
use login_consent_provider::hydra::ChallengeKind;
use std::time::Duration;

#[test]
fn test_upstream_error_classification() {
    let server_error = UpstreamError::Http {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        context: "boom".to_string(),
    };
    assert!(server_error.is_unavailable());
    assert_eq!(server_error.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));

    let not_found = UpstreamError::Http {
        status: StatusCode::NOT_FOUND,
        context: "Unable to locate the resource".to_string(),
    };
    assert!(!not_found.is_unavailable());
    assert!(not_found.to_string().contains("404"));
    assert!(not_found.to_string().contains("Unable to locate the resource"));

    assert!(UpstreamError::Timeout(Duration::from_secs(10)).is_unavailable());
    assert!(UpstreamError::Network("refused".into()).is_unavailable());
    assert_eq!(UpstreamError::Network("refused".into()).status(), None);
}

#[test]
fn test_resolve_error_from_upstream() {
    let unavailable: ResolveError = UpstreamError::Network("refused".into()).into();
    assert!(matches!(unavailable, ResolveError::UpstreamUnavailable(_)));
    assert_eq!(unavailable.status_code(), StatusCode::BAD_GATEWAY);

    let rejected: ResolveError = UpstreamError::Http {
        status: StatusCode::GONE,
        context: "challenge already used".into(),
    }
    .into();
    assert!(matches!(rejected, ResolveError::UpstreamRejected(_)));
    assert_eq!(rejected.status_code(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_resolve_error_display() {
    assert_eq!(
        ResolveError::MissingChallenge(ChallengeKind::Login).to_string(),
        "login_challenge parameter is missing"
    );
    assert_eq!(
        ResolveError::MissingChallenge(ChallengeKind::Consent).to_string(),
        "consent_challenge parameter is missing"
    );
    assert_eq!(
        ResolveError::InvalidCredentials.status_code(),
        StatusCode::UNAUTHORIZED
    );

    let lookup = ResolveError::UserLookupFailed {
        subject: "ghost".into(),
        source: UserStoreError::NotFound("ghost".into()),
    };
    assert!(lookup.to_string().contains("ghost"));
    assert_eq!(lookup.status_code(), StatusCode::BAD_REQUEST);
}

#[test]
fn test_bootstrap_error_display() {
    assert!(
        BootstrapError::Exhausted { attempts: 100 }
            .to_string()
            .contains("100 attempts")
    );
    assert!(
        BootstrapError::TimedOut(Duration::from_secs(60))
            .to_string()
            .contains("60s")
    );
}
