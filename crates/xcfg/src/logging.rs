//! Tracing subscriber setup shared by the CLI and [`ProgramContext`](crate::ProgramContext)

use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        "debug"
    } else {
        "info"
    }
}

/// Build the filter: `RUST_LOG` wins, otherwise the debug flag picks the level
pub fn filter(debug: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(debug)))
}

/// Install the global subscriber, writing to stderr.
///
/// Returns `false` when a subscriber was already installed.
pub fn try_init(debug: bool) -> bool {
    tracing_subscriber::fmt()
        .with_env_filter(filter(debug))
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}

/// [`try_init`] for callers that do not care whether logging was already set up
pub fn init(debug: bool) {
    if !try_init(debug) {
        tracing::debug!("tracing subscriber already installed");
    }
}
