use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::stderr_buffer::BufferedStderr;

/// Filter directive used when `RUST_LOG` is unset
pub fn default_directive(verbose: bool) -> &'static str {
    if verbose {
        "college_compare=debug,warn"
    } else {
        "warn"
    }
}

/// Install the global subscriber.
///
/// Events go to stderr through the stderr buffer, so anything logged while
/// the TUI owns the terminal is replayed after it exits. `RUST_LOG` takes
/// precedence over `--verbose`.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbose)));

    let layer = fmt::layer()
        .with_writer(BufferedStderr::new)
        .with_target(verbose)
        .without_time()
        .with_ansi(false);

    // A second init (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init();
}
