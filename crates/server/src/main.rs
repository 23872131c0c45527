use color_eyre::eyre::WrapErr;
use login_consent_provider::api::{app, start_webserver};
use login_consent_provider::bootstrap::{BootstrapSettings, spawn_bootstrap};
use login_consent_provider::config::load_config;
use login_consent_provider::hydra::HydraAdminClient;
use login_consent_provider::logging::{PROVIDER_DIRECTIVES, initialize_standard_tracing};
use login_consent_provider::oauth2::{ChallengeResolver, OAuth2State, RedirectRewriter};
use login_consent_provider::users::UserDirectory;
use std::sync::Arc;

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    match dotenvy::dotenv() {
        Err(e) if !e.not_found() => eprintln!("Failed to load .env file: {e}"),
        _ => {}
    }

    initialize_standard_tracing(PROVIDER_DIRECTIVES);

    let config = load_config().wrap_err("Failed to load configuration")?;
    tracing::info!(
        admin_url = %config.hydra_admin_url,
        public_url = %config.hydra_public_url,
        skip_tls_verify = config.skip_tls_verify,
        "starting login & consent provider"
    );
    if config.skip_tls_verify {
        tracing::warn!("TLS certificate verification is disabled for the authorization server");
    }

    let users = Arc::new(UserDirectory::import_file(&config.users_file));
    let admin = HydraAdminClient::from_config(&config)
        .wrap_err("Failed to set up the authorization server client")?;

    // Runs next to the server; the pages never wait for it.
    spawn_bootstrap(
        admin.clone(),
        &config.clients_file,
        BootstrapSettings::from(&config.bootstrap),
    );

    let resolver = ChallengeResolver::new(admin, users, RedirectRewriter::from_config(&config));
    let state = OAuth2State::new(resolver, &config.normalized_base_path());

    start_webserver(app(state, &config), &config).await?;
    Ok(())
}
