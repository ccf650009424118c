//! Tracing setup for the CLI. Logs go to stderr so stdout stays machine-readable.

use std::sync::Once;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Default filter for a given `-v` count.
pub fn level_for_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize the global tracing subscriber. Subsequent calls are ignored.
///
/// `RUST_LOG` takes precedence over the verbosity-derived level.
pub fn init_logging(verbose: u8, json: bool) {
    INIT.call_once(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level_for_verbosity(verbose)));

        if json {
            let fmt_layer =
                fmt::layer().json().with_target(true).with_current_span(true).with_writer(std::io::stderr);
            tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();
        } else {
            let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
            tracing_subscriber::registry().with(env_filter).with(fmt_layer).init();
        }
    });
}
