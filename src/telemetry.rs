//! Telemetry initialization (tracing/tracing-subscriber).
//!
//! LOG_LEVEL sets the filter (a level like "debug" or full directives);
//! LOG_FORMAT selects "pretty" (default) or "json" structured logs.
//!
//! The default directives cover the targets this crate logs under: the
//! generation pipeline ("generation"), startup/config ("kyozai_backend"), and
//! the per-request spans from tower-http's TraceLayer.

use tracing_subscriber::EnvFilter;

pub fn init_tracing() {
    let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| {
        EnvFilter::new("info,generation=debug,kyozai_backend=debug,tower_http=info")
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true);

    // Choose JSON vs pretty; don't try to store different layer types.
    match std::env::var("LOG_FORMAT").as_deref() {
        Ok("json") => {
            builder.json().init();
        }
        _ => {
            builder.init();
        }
    }
}
