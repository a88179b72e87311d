//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static INIT: Once = Once::new();

/// Initialize the global tracing subscriber.
///
/// `RUST_LOG` takes precedence when set; otherwise the level defaults to
/// `debug` or `info` depending on `debug_mode`. Idempotent, so tests may call
/// it freely.
pub fn init_tracing(debug_mode: bool) {
    INIT.call_once(|| {
        let default_directive = if debug_mode {
            "specwatch=debug"
        } else {
            "specwatch=info"
        };
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive));

        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true))
            .with(filter)
            .init();
    });
}
