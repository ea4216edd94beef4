//! Log output for the campus server.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_FILTER: &str = "info,campus_erp=debug,tower_http=debug";

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set. The fallback keeps `auth.*`, `chat.*` and
/// `storage.*` events at debug and the `tower_http` request and response lines.
pub fn init() {
    let filter_layer = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true)
                .compact(),
        )
        .init();
}
