//! Subscriber setup for programs that score fingerprints.
//!
//! The binding emits `debug` events when it resolves and loads
//! `nfiq2_ffi`, `info` once the NFIQ2 context is up, and a `trace` event per
//! native call. It never installs a subscriber itself; `nfiq2-score` and
//! other hosts call one of these once at startup.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Load events from this crate at `info`, everything else at `warn`.
pub const DEFAULT_FILTER: &str = "warn,nfiq2=info";

/// Install the stderr subscriber with [`DEFAULT_FILTER`].
pub fn init() {
    init_with_filter(DEFAULT_FILTER);
}

/// Install the stderr subscriber, falling back to `default_filter` when
/// `RUST_LOG` is unset or unparsable.
///
/// Output goes to stderr so stdout stays free for score reports.
pub fn init_with_filter(default_filter: &str) {
    tracing_subscriber::registry()
        .with(filter_or(default_filter))
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn filter_or(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}
