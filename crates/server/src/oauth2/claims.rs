//! Session claims attached to an accepted consent.

use crate::users::UserRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Claims for the access token and the ID token, keyed by claim name.
///
/// Serializes as the `session` object of a consent accept call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionClaims {
    pub access_token: Map<String, Value>,
    pub id_token: Map<String, Value>,
}

impl SessionClaims {
    /// Derives the claims for `user`.
    ///
    /// `email_verified` is always `true`: the directory has no verification state,
    /// every imported address is trusted.
    pub fn for_user(user: &UserRecord) -> Self {
        let groups = json!(user.roles);

        let mut access_token = Map::new();
        access_token.insert("groups".into(), groups.clone());

        let mut id_token = Map::new();
        id_token.insert("groups".into(), groups);
        id_token.insert("email".into(), json!(user.email));
        id_token.insert("email_verified".into(), Value::Bool(true));

        Self {
            access_token,
            id_token,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(roles: &[&str]) -> UserRecord {
        UserRecord {
            email: "alice@example.com".into(),
            password: "pw".into(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn id_token_carries_email_and_groups() {
        let claims = SessionClaims::for_user(&user(&["user", "admin"]));
        assert_eq!(claims.id_token["email_verified"], json!(true));
        assert_eq!(claims.id_token["email"], json!("alice@example.com"));
        assert_eq!(claims.id_token["groups"], json!(["user", "admin"]));
        assert_eq!(claims.access_token["groups"], json!(["user", "admin"]));
    }

    #[test]
    fn access_token_has_only_groups() {
        let claims = SessionClaims::for_user(&user(&["user"]));
        assert_eq!(claims.access_token.len(), 1);
        assert_eq!(claims.id_token.len(), 3);
    }

    #[test]
    fn no_roles_yields_empty_groups() {
        let claims = SessionClaims::for_user(&user(&[]));
        assert_eq!(claims.id_token["groups"], json!([]));
        assert_eq!(claims.access_token["groups"], json!([]));
        assert_eq!(claims.id_token["email_verified"], json!(true));
    }

    #[test]
    fn serializes_as_session_document() {
        let claims = SessionClaims::for_user(&user(&["user"]));
        let value = serde_json::to_value(&claims).unwrap();
        assert_eq!(value["access_token"]["groups"], json!(["user"]));
        assert_eq!(value["id_token"]["email"], json!("alice@example.com"));
    }
}
