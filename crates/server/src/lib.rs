//! A login and consent provider for an OAuth2/OpenID Connect authorization server.
//!
//! The authorization server redirects browsers here with a login or consent
//! challenge. The provider authenticates the user against an in-memory user
//! directory, attaches claims derived from the user's roles and hands the browser
//! back. At startup it can also register OAuth clients with the server.

pub mod api;
pub mod bootstrap;
pub mod config;
pub mod demo_client;
pub mod error;
pub mod http;
pub mod hydra;
pub mod logging;
pub mod oauth2;
pub mod state_store;
pub mod users;
