//! Tracing and diagnostics bootstrap.
//!
//! Call [`init_tracing`] once near the top of `main` (and [`init_miette`]
//! for pretty panic reports). Library code never installs subscribers on its
//! own; it only emits through `tracing`.

use tracing_error::ErrorLayer;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the default tracing subscriber: compact fmt layer, `RUST_LOG`
/// env filter (defaulting to `info,formweaver=info`), and an error layer so
/// span traces attach to diagnostics.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_file(false)
        .with_line_number(false)
        // Log when spans are created/closed so we see instrumented async boundaries
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info,formweaver=info"))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .with(ErrorLayer::default())
        .try_init();
}

/// Installs miette's panic hook for pretty panic reports.
pub fn init_miette() {
    miette::set_panic_hook();
}
