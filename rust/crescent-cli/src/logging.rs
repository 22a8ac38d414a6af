//! Diagnostic logging for the interpreter.
//!
//! This is separate from the verbose trace, which is program output and goes
//! to stderr whether or not `RUST_LOG` is set.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the stderr subscriber.
///
/// Reads `RUST_LOG`, defaulting to `warn`. Per-journey events are logged at
/// `debug` by `crescent_vm`:
/// ```bash
/// RUST_LOG=crescent_vm=debug crescent run hello.mc
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // A second init (e.g. from tests) is harmless; keep the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init();
}
