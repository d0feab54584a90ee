//! Logging setup.
//!
//! The engine logs through the `log` facade. Embedding applications that already install a
//! logger can skip this; everyone else calls [`init_logging`] once at startup.

/// Installs `env_logger` with an `info` default filter (`RUST_LOG` overrides it).
///
/// Safe to call more than once: later calls are ignored.
pub fn init_logging() {
    let initialized = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .try_init();
    if initialized.is_ok() {
        log::debug!("Logging initialized");
    }
}
