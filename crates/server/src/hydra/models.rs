//! Wire types of the authorization server's admin API.

use crate::oauth2::claims::SessionClaims;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Which decision a challenge asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeKind {
    Login,
    Consent,
}

impl ChallengeKind {
    /// Name of the query/form parameter carrying the challenge.
    pub fn param_name(self) -> &'static str {
        match self {
            ChallengeKind::Login => "login_challenge",
            ChallengeKind::Consent => "consent_challenge",
        }
    }
}

impl fmt::Display for ChallengeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChallengeKind::Login => f.write_str("login"),
            ChallengeKind::Consent => f.write_str("consent"),
        }
    }
}

/// Treats an explicit `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// The OAuth client that started the flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OAuthClient {
    #[serde(default, deserialize_with = "nullable")]
    pub client_id: String,
    #[serde(default, deserialize_with = "nullable")]
    pub client_name: String,
}

impl OAuthClient {
    /// Name shown to the user; falls back to the client id.
    pub fn display_name(&self) -> &str {
        if self.client_name.trim().is_empty() {
            &self.client_id
        } else {
            &self.client_name
        }
    }
}

/// Pending login or consent request as reported by the authorization server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ChallengeContext {
    #[serde(default, deserialize_with = "nullable")]
    pub challenge: String,
    #[serde(default, deserialize_with = "nullable")]
    pub subject: String,
    #[serde(default, deserialize_with = "nullable")]
    pub skip: bool,
    #[serde(default, deserialize_with = "nullable")]
    pub requested_scope: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub requested_access_token_audience: Vec<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub client: OAuthClient,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AcceptLoginRequest {
    pub subject: String,
    pub remember: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcceptConsentRequest {
    pub grant_scope: Vec<String>,
    pub grant_access_token_audience: Vec<String>,
    pub remember: bool,
    pub session: SessionClaims,
}

/// Answer to an accept call; the browser continues at `redirect_to`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CompletedRequest {
    pub redirect_to: String,
}

/// One client registration document, forwarded to the admin API unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientDefinition(pub serde_json::Value);

impl ClientDefinition {
    /// `client_id` of the definition, for log lines.
    pub fn client_id(&self) -> Option<&str> {
        self.0.get("client_id").and_then(|v| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn challenge_context_tolerates_nulls() {
        let ctx: ChallengeContext = serde_json::from_value(json!({
            "challenge": "abc",
            "skip": false,
            "subject": "",
            "requested_scope": null,
            "requested_access_token_audience": null,
            "client": { "client_id": "app", "client_name": null },
            "request_url": "http://hydra/oauth2/auth?client_id=app"
        }))
        .expect("deserialize");

        assert_eq!(ctx.challenge, "abc");
        assert!(ctx.requested_scope.is_empty());
        assert!(ctx.requested_access_token_audience.is_empty());
        assert_eq!(ctx.client.display_name(), "app");
    }

    #[test]
    fn challenge_context_keeps_scope_order() {
        let ctx: ChallengeContext = serde_json::from_value(json!({
            "skip": true,
            "subject": "alice@example.com",
            "requested_scope": ["openid", "profile", "email"],
            "client": { "client_id": "app", "client_name": "My App" }
        }))
        .expect("deserialize");

        assert!(ctx.skip);
        assert_eq!(ctx.requested_scope, ["openid", "profile", "email"]);
        assert_eq!(ctx.client.display_name(), "My App");
    }

    #[test]
    fn challenge_kind_param_names() {
        assert_eq!(ChallengeKind::Login.param_name(), "login_challenge");
        assert_eq!(ChallengeKind::Consent.param_name(), "consent_challenge");
    }

    #[test]
    fn client_definition_is_transparent() {
        let def = ClientDefinition(json!({"client_id": "c1", "scope": "openid"}));
        assert_eq!(def.client_id(), Some("c1"));
        assert_eq!(
            serde_json::to_value(&def).unwrap(),
            json!({"client_id": "c1", "scope": "openid"})
        );
    }
}
