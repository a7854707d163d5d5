//! Development-time tracing for debugging tool invocations.
//!
//! Diagnostics go to stderr via `RUST_LOG`. Captured tool output is echoed
//! through the same subscriber by the invocation operation (stdout at info,
//! stderr at error) when verbose is on or the tool fails.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing subscriber for development logging.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset.
/// Output: stderr, compact format.
///
/// # Example
/// ```bash
/// RUST_LOG=jvmtool=debug jvmtool run jlink --dest out/image
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
