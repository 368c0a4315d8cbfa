// Logging setup
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const DEFAULT_FILTER: &str = "velib_api=info,tower_http=info";

/// Installs the global subscriber. `RUST_LOG` overrides the default filter;
/// production posture switches to one JSON object per line.
pub fn init_tracing(production: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(filter);

    if production {
        registry.with(fmt::layer().json().with_current_span(false)).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
