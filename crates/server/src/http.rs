//! Outbound HTTP client shared by the authorization-server client and the demo client.
//!
//! Wraps hyper's pooled client with a rustls connector, an overall request timeout
//! and a body collector so callers only deal with a status and bytes.

use crate::error::UpstreamError;
use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderValue, USER_AGENT};
use hyper::{Method, Request, StatusCode, Uri};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{Client, connect::HttpConnector};
use hyper_util::rt::TokioExecutor;
use serde::Serialize;
use std::time::Duration;
use tokio::time::timeout;

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const CLIENT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Status and collected body of a finished request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: Bytes,
}

impl HttpResponse {
    /// Short description of the body for error messages.
    ///
    /// Prefers `error_description`/`error` from an OAuth-style JSON error document.
    pub fn context(&self) -> String {
        if let Ok(value) = serde_json::from_slice::<serde_json::Value>(&self.body) {
            for key in ["error_description", "error", "message"] {
                if let Some(s) = value.get(key).and_then(|v| v.as_str()) {
                    return s.to_string();
                }
            }
        }
        let text = String::from_utf8_lossy(&self.body);
        text.chars().take(200).collect()
    }
}

#[derive(Clone)]
pub struct HttpClient {
    inner: Client<HttpsConnector<HttpConnector>, Full<Bytes>>,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(skip_tls_verify: bool) -> Result<Self, UpstreamError> {
        let tls = if skip_tls_verify {
            tls::unverified_config()
        } else {
            tls::shared_config()
        }
        .map_err(|e| UpstreamError::Tls(e.to_string()))?;
        let connector = HttpsConnectorBuilder::new()
            .with_tls_config((*tls).clone())
            .https_or_http()
            .enable_http1()
            .build();
        Ok(Self {
            inner: Client::builder(TokioExecutor::new()).build(connector),
            timeout: REQUEST_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn get(&self, url: &str) -> Result<HttpResponse, UpstreamError> {
        let req = self.builder(Method::GET, url)?;
        self.execute(req, Bytes::new()).await
    }

    pub async fn send_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        payload: &T,
    ) -> Result<HttpResponse, UpstreamError> {
        let body = serde_json::to_vec(payload).map_err(|e| UpstreamError::Json(e.to_string()))?;
        let req = self
            .builder(method, url)?
            .header(CONTENT_TYPE, "application/json");
        self.execute(req, Bytes::from(body)).await
    }

    /// POST an `application/x-www-form-urlencoded` body, optionally with an
    /// `Authorization` header value.
    pub async fn post_form(
        &self,
        url: &str,
        fields: &[(&str, &str)],
        authorization: Option<&str>,
    ) -> Result<HttpResponse, UpstreamError> {
        let body = fields
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect::<Vec<_>>()
            .join("&");
        let mut req = self
            .builder(Method::POST, url)?
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(value) = authorization {
            let value = HeaderValue::from_str(value)
                .map_err(|e| UpstreamError::Network(format!("invalid authorization header: {e}")))?;
            req = req.header(AUTHORIZATION, value);
        }
        self.execute(req, Bytes::from(body)).await
    }

    fn builder(&self, method: Method, url: &str) -> Result<hyper::http::request::Builder, UpstreamError> {
        let uri: Uri = url
            .parse()
            .map_err(|e| UpstreamError::InvalidUrl(format!("{url}: {e}")))?;
        Ok(Request::builder()
            .method(method)
            .uri(uri)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .header(ACCEPT, "application/json"))
    }

    #[tracing::instrument(name = "http_request", level = "debug", skip(self, req, body))]
    async fn execute(
        &self,
        req: hyper::http::request::Builder,
        body: Bytes,
    ) -> Result<HttpResponse, UpstreamError> {
        let req = req
            .body(Full::new(body))
            .map_err(|e| UpstreamError::Network(e.to_string()))?;
        let method = req.method().clone();
        let uri = req.uri().clone();

        let exchange = async {
            let resp = self
                .inner
                .request(req)
                .await
                .map_err(|e| UpstreamError::Network(e.to_string()))?;
            let status = resp.status();
            let body = resp
                .into_body()
                .collect()
                .await
                .map_err(|e| UpstreamError::Network(e.to_string()))?
                .to_bytes();
            Ok(HttpResponse { status, body })
        };

        let result = timeout(self.timeout, exchange)
            .await
            .map_err(|_| UpstreamError::Timeout(self.timeout))?;
        match &result {
            Ok(resp) => tracing::debug!(%method, %uri, status = %resp.status, "upstream response"),
            Err(e) => tracing::debug!(%method, %uri, error = %e, "upstream request failed"),
        }
        result
    }
}

/// rustls client configurations, built once per verification mode.
pub mod tls {
    use once_cell::sync::OnceCell;
    use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
    use rustls::crypto::{CryptoProvider, verify_tls12_signature, verify_tls13_signature};
    use rustls::pki_types::{CertificateDer, ServerName, UnixTime};
    use rustls::{ClientConfig, DigitallySignedStruct, RootCertStore, SignatureScheme};
    use std::sync::Arc;

    static TLS_CONFIG: OnceCell<Arc<ClientConfig>> = OnceCell::new();
    static UNVERIFIED_TLS_CONFIG: OnceCell<Arc<ClientConfig>> = OnceCell::new();

    fn provider() -> Arc<CryptoProvider> {
        Arc::new(rustls::crypto::ring::default_provider())
    }

    fn builder() -> Result<rustls::ConfigBuilder<ClientConfig, rustls::WantsVerifier>, rustls::Error>
    {
        ClientConfig::builder_with_provider(provider()).with_safe_default_protocol_versions()
    }

    /// Client configuration validating against the webpki root store.
    pub fn shared_config() -> Result<Arc<ClientConfig>, rustls::Error> {
        TLS_CONFIG
            .get_or_try_init(|| {
                let mut root_cert_store = RootCertStore::empty();
                root_cert_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());

                let config = builder()?
                    .with_root_certificates(root_cert_store)
                    .with_no_client_auth();

                Ok(Arc::new(config))
            })
            .cloned()
    }

    /// Client configuration that accepts any server certificate.
    ///
    /// Handshake signatures are still verified; only the chain and name checks are skipped.
    pub fn unverified_config() -> Result<Arc<ClientConfig>, rustls::Error> {
        UNVERIFIED_TLS_CONFIG
            .get_or_try_init(|| {
                let config = builder()?
                    .dangerous()
                    .with_custom_certificate_verifier(Arc::new(AcceptAnyCertificate(provider())))
                    .with_no_client_auth();
                Ok(Arc::new(config))
            })
            .cloned()
    }

    #[derive(Debug)]
    struct AcceptAnyCertificate(Arc<CryptoProvider>);

    impl ServerCertVerifier for AcceptAnyCertificate {
        fn verify_server_cert(
            &self,
            _end_entity: &CertificateDer<'_>,
            _intermediates: &[CertificateDer<'_>],
            _server_name: &ServerName<'_>,
            _ocsp_response: &[u8],
            _now: UnixTime,
        ) -> Result<ServerCertVerified, rustls::Error> {
            Ok(ServerCertVerified::assertion())
        }

        fn verify_tls12_signature(
            &self,
            message: &[u8],
            cert: &CertificateDer<'_>,
            dss: &DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, rustls::Error> {
            verify_tls12_signature(message, cert, dss, &self.0.signature_verification_algorithms)
        }

        fn verify_tls13_signature(
            &self,
            message: &[u8],
            cert: &CertificateDer<'_>,
            dss: &DigitallySignedStruct,
        ) -> Result<HandshakeSignatureValid, rustls::Error> {
            verify_tls13_signature(message, cert, dss, &self.0.signature_verification_algorithms)
        }

        fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
            self.0.signature_verification_algorithms.supported_schemes()
        }
    }

}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_prefers_oauth_error_description() {
        let resp = HttpResponse {
            status: StatusCode::NOT_FOUND,
            body: Bytes::from_static(
                br#"{"error":"Not Found","error_description":"Unable to locate the requested resource"}"#,
            ),
        };
        assert_eq!(resp.context(), "Unable to locate the requested resource");
    }

    #[test]
    fn context_falls_back_to_truncated_text() {
        let resp = HttpResponse {
            status: StatusCode::BAD_GATEWAY,
            body: Bytes::from("x".repeat(500)),
        };
        assert_eq!(resp.context().len(), 200);
    }

    #[tokio::test]
    async fn invalid_url_is_reported() {
        let client = HttpClient::new(false).unwrap();
        let err = client.get("not a url").await.expect_err("must fail");
        assert!(matches!(err, UpstreamError::InvalidUrl(_)));
    }
}
