//! Tracing subscriber setup.
//!
//! The library only emits `tracing` events. Applications that do not install
//! their own subscriber can call [`init`] with the `logging` feature enabled.
//! The filter comes from `TABULA_LOG`, then `RUST_LOG`, then the given level
//! applied to this crate only.

#[cfg(feature = "logging")]
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable consulted before `RUST_LOG`.
pub const LOG_ENV: &str = "TABULA_LOG";

/// Default directive: dependencies at `warn`, this crate at `level`.
pub fn default_directive(level: &str) -> String {
    format!("warn,tabula_core={level}")
}

/// Initialize logging at `info`.
///
/// ```rust
/// tabula_core::logging::init();
/// ```
#[cfg(feature = "logging")]
pub fn init() {
    init_with_level("info")
}

/// Initialize logging with this crate at `level` (trace, debug, info, warn,
/// error) unless an environment filter is set. Does nothing if a global
/// subscriber is already installed.
#[cfg(feature = "logging")]
pub fn init_with_level(level: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));

    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}

/// Debug level, captured by the test harness.
#[cfg(feature = "logging")]
pub fn init_test() {
    let _ = fmt()
        .with_env_filter(EnvFilter::new(default_directive("debug")))
        .with_test_writer()
        .try_init();
}

#[cfg(not(feature = "logging"))]
pub fn init() {}

#[cfg(not(feature = "logging"))]
pub fn init_with_level(_level: &str) {}

#[cfg(not(feature = "logging"))]
pub fn init_test() {}
