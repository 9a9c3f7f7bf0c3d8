//! Logging setup for the simulation core

pub use log::{debug, error, info, trace, warn};

/// Initialize the logging system from the environment (`RUST_LOG`).
///
/// Safe to call more than once; subsequent calls are ignored.
pub fn init() {
    let _ = env_logger::Builder::from_default_env().try_init();
}
