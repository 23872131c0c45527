//! Tracing subscriber setup shared by the binaries.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter of the provider binary when `RUST_LOG` is unset.
pub const PROVIDER_DIRECTIVES: &str = "login_consent_provider=info,tower_http=info,hyper=warn";

/// Default filter of the demo client binary when `RUST_LOG` is unset.
pub const DEMO_CLIENT_DIRECTIVES: &str =
    "demo_client=info,login_consent_provider=info,tower_http=info,hyper=warn";

/// Installs an `EnvFilter` + fmt subscriber. `RUST_LOG` wins over `default_directives`.
pub fn initialize_standard_tracing(default_directives: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives));

    let registry = tracing_subscriber::registry().with(env_filter);
    let layer = fmt::layer().with_target(true).with_level(true);

    registry.with(layer).init();
}
