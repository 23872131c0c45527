//! HTTP surface of the provider.
//!
//! - `health` - Health check endpoint (`{base}/health`)
//! - `openapi` - OpenAPI/Utoipa configuration
//!
//! Login, consent and error pages come from [`crate::oauth2::router`]. Everything,
//! static assets and API docs included, is mounted below the configured base path.

pub mod health;
pub mod openapi;

pub use health::MISC_TAG;

use crate::config::AppConfig;
use crate::hydra::AdminApi;
use crate::oauth2::{self, OAuth2State};
use axum::Router;
use tower_http::{services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_redoc::{Redoc, Servable};

/// Builds the complete application router.
pub fn app<A: AdminApi>(state: OAuth2State<A>, config: &AppConfig) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(openapi::ApiDoc::openapi())
        .merge(oauth2::router(state))
        .routes(routes!(health::health))
        .split_for_parts();

    let router = router
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .merge(Redoc::with_url("/api-docs", api));

    let base = config.normalized_base_path();
    let router = if base.is_empty() {
        router
    } else {
        Router::new().nest(&base, router)
    };

    router.layer(TraceLayer::new_for_http())
}

/// Serves `app` on the configured address until a shutdown signal arrives.
#[tracing::instrument(skip(app, config))]
pub async fn start_webserver(app: Router, config: &AppConfig) -> color_eyre::Result<()> {
    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    tracing::info!(
        addr = %config.listen_addr,
        base_path = %config.normalized_base_path(),
        "Server running"
    );
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| color_eyre::Report::msg(format!("Failed to start server: {e}")))?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
