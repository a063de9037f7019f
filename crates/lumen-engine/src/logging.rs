//! `tracing` subscriber setup for binaries and tools.

use tracing_subscriber::EnvFilter;

/// Install a formatted subscriber on stderr.
///
/// `RUST_LOG` wins when set; otherwise `fallback` is used as the filter
/// directive (for example `"warn"` or `"lumen_tween=debug"`). Returns
/// `false` if a global subscriber was already installed, which is harmless
/// in tests that share a process.
pub fn init_tracing(fallback: &str) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .is_ok()
}
