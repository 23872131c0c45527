use color_eyre::eyre::WrapErr;
use login_consent_provider::api::shutdown_signal;
use login_consent_provider::config::load_demo_client_config;
use login_consent_provider::demo_client::{DemoClientState, router};
use login_consent_provider::logging::{DEMO_CLIENT_DIRECTIVES, initialize_standard_tracing};
use std::time::Duration;

#[tokio::main]
async fn main() -> color_eyre::eyre::Result<()> {
    color_eyre::install()?;
    match dotenvy::dotenv() {
        Err(e) if !e.not_found() => eprintln!("Failed to load .env file: {e}"),
        _ => {}
    }

    initialize_standard_tracing(DEMO_CLIENT_DIRECTIVES);

    let config = load_demo_client_config().wrap_err("Failed to load demo client configuration")?;
    let listen_addr = config.listen_addr.clone();
    let purge_every = Duration::from_secs((config.state_ttl_secs / 2).max(1));
    let state = DemoClientState::new(config).wrap_err("Failed to set up HTTP client")?;

    {
        let states = state.states.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(purge_every);
            loop {
                interval.tick().await;
                let purged = states.purge_expired();
                if purged > 0 {
                    tracing::debug!(purged, remaining = states.len(), "purged expired states");
                }
            }
        });
    }

    let states = state.states.clone();
    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!(addr = %listen_addr, "demo client running");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    states.clear();
    tracing::info!("demo client stopped");
    Ok(())
}
