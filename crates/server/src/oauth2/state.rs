//! Shared state of the login and consent endpoints.

use crate::hydra::AdminApi;
use crate::oauth2::resolver::ChallengeResolver;
use std::sync::Arc;

pub struct OAuth2State<A> {
    pub resolver: Arc<ChallengeResolver<A>>,
    /// Prefix the pages are mounted under, without trailing slash. Used for form
    /// actions and asset links in the rendered views.
    pub base_path: String,
}

impl<A> Clone for OAuth2State<A> {
    fn clone(&self) -> Self {
        Self {
            resolver: self.resolver.clone(),
            base_path: self.base_path.clone(),
        }
    }
}

impl<A: AdminApi> OAuth2State<A> {
    pub fn new(resolver: ChallengeResolver<A>, base_path: &str) -> Self {
        Self {
            resolver: Arc::new(resolver),
            base_path: base_path.trim_end_matches('/').to_string(),
        }
    }
}
