//! Tracing subscriber setup.

use std::sync::Once;

use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, EnvFilter};

/// Directive used when neither the caller nor `RUST_LOG` supplies one.
pub const DEFAULT_LOG_FILTER: &str = "rehab_ledger_core=info";

static TRACING_INIT: Once = Once::new();

/// Install a `fmt` subscriber once per process.
///
/// `RUST_LOG` is honoured; `filter` is added on top of it. An unparsable
/// directive falls back to [`DEFAULT_LOG_FILTER`]. Later calls are no-ops, and
/// a subscriber installed elsewhere first is left in place.
pub fn init_tracing(filter: &str) {
    TRACING_INIT.call_once(|| {
        let directive = filter
            .parse::<Directive>()
            .or_else(|_| DEFAULT_LOG_FILTER.parse::<Directive>());

        let mut env_filter = EnvFilter::from_default_env();
        if let Ok(directive) = directive {
            env_filter = env_filter.add_directive(directive);
        }

        let _ = fmt().with_env_filter(env_filter).try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_tracing(DEFAULT_LOG_FILTER);
        init_tracing("not a == directive");
        tracing::info!("tracing initialized");
    }
}
