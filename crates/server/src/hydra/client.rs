use super::{
    AcceptConsentRequest, AcceptLoginRequest, AdminApi, ChallengeContext, ChallengeKind,
    ClientDefinition, CompletedRequest,
};
use crate::config::AppConfig;
use crate::error::UpstreamError;
use crate::http::{HttpClient, HttpResponse};
use hyper::{Method, StatusCode};
use serde::de::DeserializeOwned;

/// [`AdminApi`] over HTTP.
#[derive(Clone)]
pub struct HydraAdminClient {
    http: HttpClient,
    admin_url: String,
    public_url: String,
}

impl HydraAdminClient {
    pub fn new(http: HttpClient, admin_url: &str, public_url: &str) -> Self {
        Self {
            http,
            admin_url: admin_url.trim_end_matches('/').to_string(),
            public_url: public_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, UpstreamError> {
        let http = HttpClient::new(config.skip_tls_verify)?;
        Ok(Self::new(
            http,
            &config.hydra_admin_url,
            &config.hydra_public_url,
        ))
    }

    fn request_url(&self, kind: ChallengeKind, action: Option<&str>, challenge: &str) -> String {
        let mut url = format!("{}/oauth2/auth/requests/{kind}", self.admin_url);
        if let Some(action) = action {
            url.push('/');
            url.push_str(action);
        }
        url.push('?');
        url.push_str(kind.param_name());
        url.push('=');
        url.push_str(&urlencoding::encode(challenge));
        url
    }

    async fn get_request(
        &self,
        kind: ChallengeKind,
        challenge: &str,
    ) -> Result<ChallengeContext, UpstreamError> {
        let resp = self.http.get(&self.request_url(kind, None, challenge)).await?;
        decode(resp)
    }
}

fn decode<T: DeserializeOwned>(resp: HttpResponse) -> Result<T, UpstreamError> {
    if !resp.status.is_success() {
        return Err(UpstreamError::Http {
            status: resp.status,
            context: resp.context(),
        });
    }
    serde_json::from_slice(&resp.body).map_err(|e| UpstreamError::Json(e.to_string()))
}

impl AdminApi for HydraAdminClient {
    #[tracing::instrument(skip(self, challenge))]
    async fn get_login_request(&self, challenge: &str) -> Result<ChallengeContext, UpstreamError> {
        self.get_request(ChallengeKind::Login, challenge).await
    }

    #[tracing::instrument(skip(self, challenge, body), fields(subject = %body.subject))]
    async fn accept_login_request(
        &self,
        challenge: &str,
        body: &AcceptLoginRequest,
    ) -> Result<CompletedRequest, UpstreamError> {
        let url = self.request_url(ChallengeKind::Login, Some("accept"), challenge);
        decode(self.http.send_json(Method::PUT, &url, body).await?)
    }

    #[tracing::instrument(skip(self, challenge))]
    async fn get_consent_request(
        &self,
        challenge: &str,
    ) -> Result<ChallengeContext, UpstreamError> {
        self.get_request(ChallengeKind::Consent, challenge).await
    }

    #[tracing::instrument(skip(self, challenge, body))]
    async fn accept_consent_request(
        &self,
        challenge: &str,
        body: &AcceptConsentRequest,
    ) -> Result<CompletedRequest, UpstreamError> {
        let url = self.request_url(ChallengeKind::Consent, Some("accept"), challenge);
        decode(self.http.send_json(Method::PUT, &url, body).await?)
    }

    async fn probe_ready(&self) -> Result<(), UpstreamError> {
        let resp = self
            .http
            .get(&format!("{}/health/ready", self.public_url))
            .await?;
        if resp.status.is_success() {
            Ok(())
        } else {
            Err(UpstreamError::Http {
                status: resp.status,
                context: resp.context(),
            })
        }
    }

    #[tracing::instrument(skip(self, client), fields(client_id = client.client_id().unwrap_or("-")))]
    async fn create_client(&self, client: &ClientDefinition) -> Result<(), UpstreamError> {
        let url = format!("{}/clients", self.admin_url);
        let resp = self.http.send_json(Method::POST, &url, client).await?;
        if resp.status == StatusCode::CREATED {
            Ok(())
        } else {
            Err(UpstreamError::Http {
                status: resp.status,
                context: resp.context(),
            })
        }
    }
}
