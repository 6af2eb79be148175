use std::sync::atomic::{AtomicBool, Ordering};

static JSON_MODE: AtomicBool = AtomicBool::new(false);

/// `--json`: command results go to stdout as a single envelope.
pub fn set_json_mode(on: bool) { JSON_MODE.store(on, Ordering::Relaxed); }

pub fn json_mode() -> bool { JSON_MODE.load(Ordering::Relaxed) }

pub fn logs_are_json() -> bool {
    matches!(std::env::var("GATOR_LOG_FORMAT").as_deref(), Ok("json"))
}

/// Initialize tracing according to RUST_LOG and GATOR_LOG_FORMAT.
/// - Defaults to `info` if `RUST_LOG` is unset
/// - `GATOR_LOG_FORMAT=json` switches to JSON lines
/// Logs always go to stderr so stdout stays reserved for command output.
pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let fmt_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);
    let builder = tracing_subscriber::registry().with(filter);

    if logs_are_json() {
        let _ = builder.with(fmt_layer.json().flatten_event(true)).try_init();
    } else {
        let _ = builder.with(fmt_layer.compact()).try_init();
    }
}
