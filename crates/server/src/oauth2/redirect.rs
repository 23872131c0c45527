//! Rewriting of redirect targets handed out by the authorization server.
//!
//! When the server only knows its internal address, the `redirect_to` of an
//! accept call points at a host the browser cannot reach. The first occurrence of
//! that host is swapped for the configured external one.

use crate::config::AppConfig;

/// Replaces the first occurrence of `internal_host` in `url` with `external_host`.
///
/// Returns `url` unchanged when `external_host` is blank, `internal_host` is empty,
/// or `url` does not contain `internal_host`.
pub fn rewrite_redirect(url: &str, internal_host: &str, external_host: &str) -> String {
    let external_host = external_host.trim();
    if external_host.is_empty() || internal_host.is_empty() || !url.contains(internal_host) {
        return url.to_string();
    }
    url.replacen(internal_host, external_host, 1)
}

#[derive(Debug, Clone, Default)]
pub struct RedirectRewriter {
    match_host: String,
    external_host: String,
}

impl RedirectRewriter {
    /// `issuer_uri` wins over `public_url` as match target when it is set.
    pub fn new(public_url: &str, issuer_uri: &str, external_host: &str) -> Self {
        let match_host = if issuer_uri.trim().is_empty() {
            public_url
        } else {
            issuer_uri
        };
        Self {
            match_host: match_host.trim().to_string(),
            external_host: external_host.trim().to_string(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            &config.hydra_public_url,
            &config.issuer_uri,
            &config.alternative_redirect_hydra_url,
        )
    }

    pub fn is_active(&self) -> bool {
        !self.external_host.is_empty() && !self.match_host.is_empty()
    }

    pub fn rewrite(&self, url: &str) -> String {
        let rewritten = rewrite_redirect(url, &self.match_host, &self.external_host);
        if rewritten != url {
            tracing::debug!(from = %url, to = %rewritten, "rewrote redirect target");
        }
        rewritten
    }
}
