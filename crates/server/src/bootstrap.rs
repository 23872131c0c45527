//! One-time registration of OAuth clients at startup.
//!
//! The authorization server usually starts alongside the provider, so the
//! registration first polls its readiness endpoint. Polling is raced against an
//! overall deadline; whichever finishes first decides the outcome and the loser is
//! dropped. Nothing here is fatal: without registered clients the pages are still
//! served.

use crate::config::BootstrapConfig;
use crate::error::BootstrapError;
use crate::hydra::{AdminApi, ClientDefinition};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BootstrapSettings {
    /// Overall deadline for the readiness polling.
    pub timeout: Duration,
    /// Pause between two readiness probes.
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for BootstrapSettings {
    fn default() -> Self {
        Self::from(&BootstrapConfig::default())
    }
}

impl From<&BootstrapConfig> for BootstrapSettings {
    fn from(config: &BootstrapConfig) -> Self {
        Self {
            timeout: config.timeout(),
            interval: config.interval(),
            max_attempts: config.max_attempts,
        }
    }
}

/// Tally of one registration run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationReport {
    pub attempted: usize,
    pub created: usize,
    pub failed: usize,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ClientPayload {
    Many(Vec<Value>),
    One(Map<String, Value>),
}

/// Parses a bootstrap file holding either one client definition or an array of them.
pub fn parse_client_definitions(payload: &[u8]) -> Result<Vec<ClientDefinition>, BootstrapError> {
    let parsed: ClientPayload = serde_json::from_slice(payload)
        .map_err(|e| BootstrapError::InvalidPayload(e.to_string()))?;
    Ok(match parsed {
        ClientPayload::Many(items) => items.into_iter().map(ClientDefinition).collect(),
        ClientPayload::One(item) => vec![ClientDefinition(Value::Object(item))],
    })
}

/// Polls the readiness endpoint until it answers, returning the number of probes used.
#[tracing::instrument(skip(admin))]
pub async fn wait_until_ready<A: AdminApi>(
    admin: &A,
    settings: &BootstrapSettings,
) -> Result<u32, BootstrapError> {
    let polling = async {
        for attempt in 1..=settings.max_attempts {
            match admin.probe_ready().await {
                Ok(()) => return Ok(attempt),
                Err(e) => {
                    tracing::debug!(attempt, error = %e, "authorization server not ready yet")
                }
            }
            if attempt < settings.max_attempts {
                tokio::time::sleep(settings.interval).await;
            }
        }
        Err(BootstrapError::Exhausted {
            attempts: settings.max_attempts,
        })
    };

    tokio::time::timeout(settings.timeout, polling)
        .await
        .unwrap_or(Err(BootstrapError::TimedOut(settings.timeout)))
}

/// Registers every definition independently; a failure never stops the others.
pub async fn register_all<A: AdminApi>(
    admin: &A,
    clients: &[ClientDefinition],
) -> RegistrationReport {
    let mut report = RegistrationReport::default();
    for client in clients {
        report.attempted += 1;
        let client_id = client.client_id().unwrap_or("-");
        match admin.create_client(client).await {
            Ok(()) => {
                report.created += 1;
                tracing::info!(client_id, "client registered");
            }
            Err(e) => {
                report.failed += 1;
                tracing::warn!(client_id, error = %e, "client was not created");
            }
        }
    }
    report
}

/// Waits for the authorization server, then registers the clients in `payload`.
pub async fn bootstrap<A: AdminApi>(
    admin: &A,
    payload: &[u8],
    settings: &BootstrapSettings,
) -> Result<RegistrationReport, BootstrapError> {
    let attempts = wait_until_ready(admin, settings).await?;
    tracing::info!(attempts, "authorization server is ready");

    let clients = parse_client_definitions(payload)?;
    Ok(register_all(admin, &clients).await)
}

/// Starts the client import in the background.
///
/// Returns `None` when there is nothing to import. The returned task never fails;
/// every outcome is logged.
pub fn spawn_bootstrap<A: AdminApi>(
    admin: A,
    path: &Path,
    settings: BootstrapSettings,
) -> Option<JoinHandle<()>> {
    let payload = match std::fs::read(path) {
        Ok(payload) => payload,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "no clients to import");
            return None;
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "could not read client import file");
            return None;
        }
    };

    tracing::info!(path = %path.display(), "importing clients");
    Some(tokio::spawn(async move {
        match bootstrap(&admin, &payload, &settings).await {
            Ok(report) => tracing::info!(
                attempted = report.attempted,
                created = report.created,
                failed = report.failed,
                "client import finished"
            ),
            Err(e) => tracing::error!(error = %e, "client import aborted"),
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpstreamError;
    use crate::hydra::{
        AcceptConsentRequest, AcceptLoginRequest, ChallengeContext, CompletedRequest,
    };
    use hyper::StatusCode;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Becomes ready after `ready_after` failed probes; rejects clients listed in `reject`.
    #[derive(Default)]
    struct FakeAdmin {
        ready_after: Option<u32>,
        probes: AtomicU32,
        reject: Vec<&'static str>,
        registered: Mutex<Vec<String>>,
    }

    fn unused() -> UpstreamError {
        UpstreamError::Network("not used by the bootstrapper".into())
    }

    impl AdminApi for FakeAdmin {
        async fn get_login_request(&self, _: &str) -> Result<ChallengeContext, UpstreamError> {
            Err(unused())
        }

        async fn accept_login_request(
            &self,
            _: &str,
            _: &AcceptLoginRequest,
        ) -> Result<CompletedRequest, UpstreamError> {
            Err(unused())
        }

        async fn get_consent_request(&self, _: &str) -> Result<ChallengeContext, UpstreamError> {
            Err(unused())
        }

        async fn accept_consent_request(
            &self,
            _: &str,
            _: &AcceptConsentRequest,
        ) -> Result<CompletedRequest, UpstreamError> {
            Err(unused())
        }

        async fn probe_ready(&self) -> Result<(), UpstreamError> {
            let failed_so_far = self.probes.fetch_add(1, Ordering::SeqCst);
            match self.ready_after {
                Some(n) if failed_so_far >= n => Ok(()),
                _ => Err(UpstreamError::Network("connection refused".into())),
            }
        }

        async fn create_client(&self, client: &ClientDefinition) -> Result<(), UpstreamError> {
            let id = client.client_id().unwrap_or_default().to_string();
            self.registered.lock().unwrap().push(id.clone());
            if self.reject.iter().any(|r| *r == id) {
                return Err(UpstreamError::Http {
                    status: StatusCode::CONFLICT,
                    context: "client exists".into(),
                });
            }
            Ok(())
        }
    }

    fn fast(timeout_ms: u64, max_attempts: u32) -> BootstrapSettings {
        BootstrapSettings {
            timeout: Duration::from_millis(timeout_ms),
            interval: Duration::from_millis(5),
            max_attempts,
        }
    }

    #[test]
    fn defaults_poll_every_second_for_a_minute() {
        let settings = BootstrapSettings::default();
        assert_eq!(settings.timeout, Duration::from_secs(60));
        assert_eq!(settings.interval, Duration::from_secs(1));
        assert_eq!(settings.max_attempts, 100);
    }

    #[test]
    fn parses_single_and_many() {
        let one = parse_client_definitions(br#"{"client_id":"a"}"#).unwrap();
        assert_eq!(one.len(), 1);
        assert_eq!(one[0].client_id(), Some("a"));

        let many =
            parse_client_definitions(br#"  [{"client_id":"a"},{"client_id":"b"}]"#).unwrap();
        let ids: Vec<_> = many.iter().filter_map(|c| c.client_id()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[test]
    fn rejects_garbage_payload() {
        assert!(matches!(
            parse_client_definitions(b"not json"),
            Err(BootstrapError::InvalidPayload(_))
        ));
        assert!(matches!(
            parse_client_definitions(b"42"),
            Err(BootstrapError::InvalidPayload(_))
        ));
    }

    #[tokio::test]
    async fn ready_after_a_few_probes() {
        let admin = FakeAdmin {
            ready_after: Some(2),
            ..Default::default()
        };
        let attempts = wait_until_ready(&admin, &fast(5_000, 100)).await.unwrap();
        assert_eq!(attempts, 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let admin = FakeAdmin::default();
        let err = wait_until_ready(&admin, &fast(5_000, 3)).await.unwrap_err();
        assert!(matches!(err, BootstrapError::Exhausted { attempts: 3 }));
        assert_eq!(admin.probes.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn no_pause_after_the_last_probe() {
        let admin = FakeAdmin::default();
        let settings = BootstrapSettings {
            timeout: Duration::from_secs(10),
            interval: Duration::from_secs(1),
            max_attempts: 1,
        };
        let started = std::time::Instant::now();
        let err = wait_until_ready(&admin, &settings).await.unwrap_err();
        assert!(matches!(err, BootstrapError::Exhausted { attempts: 1 }));
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn deadline_wins_and_nothing_is_registered() {
        let admin = FakeAdmin::default();
        let err = bootstrap(&admin, br#"{"client_id":"a"}"#, &fast(40, 100_000))
            .await
            .unwrap_err();
        assert!(matches!(err, BootstrapError::TimedOut(_)));
        assert!(admin.registered.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_registration_does_not_stop_the_rest() {
        let admin = FakeAdmin {
            ready_after: Some(0),
            reject: vec!["first"],
            ..Default::default()
        };
        let payload = serde_json::to_vec(&json!([
            {"client_id": "first"},
            {"client_id": "second"}
        ]))
        .unwrap();

        let report = bootstrap(&admin, &payload, &fast(5_000, 10)).await.unwrap();
        assert_eq!(
            report,
            RegistrationReport {
                attempted: 2,
                created: 1,
                failed: 1
            }
        );
        assert_eq!(*admin.registered.lock().unwrap(), ["first", "second"]);
    }

    #[tokio::test]
    async fn missing_file_spawns_nothing() {
        let handle = spawn_bootstrap(
            FakeAdmin::default(),
            Path::new("does/not/exist.json"),
            BootstrapSettings::default(),
        );
        assert!(handle.is_none());
    }
}
