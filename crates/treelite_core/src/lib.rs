//! Core of the treelite common C API: build capability probe and the
//! process-wide log callback registry shared by every internal log call site.

pub mod capability;
pub mod log_callback;
pub mod logging;

pub use capability::{parallel_support, parallel_support_flag, BuildCapabilities};
pub use log_callback::{
    invoke_log_callback, log_callback_registered, register_log_callback, LogCallback,
    LogCallbackFn, LogCallbackRegistry, LogCallbackRegistryStore, RegistryError,
};
pub use logging::{default_log_level, emit_log_message, init_logging, logging_status};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
