//! C-linkage entry points of the common API.
//!
//! # Responsibility
//! - Expose the build capability probe and log callback registration to
//!   host languages through stable, unmangled symbols.
//! - Initialize core logging lazily on first registration.
//!
//! # Invariants
//! - Exported functions must not unwind across the boundary.
//! - Status-returning functions return `0` on success and nonzero on failure;
//!   details go to `TreeliteGetLastError`.
//!
//! # See also
//! - include/treelite/c_api_common.h

#![allow(non_snake_case)]

use crate::api_guard::{api_guard, last_error_ptr};
use std::os::raw::{c_char, c_int};
use std::sync::OnceLock;
use treelite_core::{
    default_log_level, init_logging, parallel_support_flag, register_log_callback, LogCallback,
};

const LOG_LEVEL_ENV: &str = "TREELITE_LOG_LEVEL";
static LOGGING_READY: OnceLock<()> = OnceLock::new();

/// Returns `1` when built with parallel-execution support, `0` otherwise.
///
/// # FFI contract
/// - Cannot fail; constant for the process lifetime.
#[no_mangle]
pub extern "C" fn TreeliteOpenMPSupported() -> c_int {
    parallel_support_flag()
}

/// Routes every subsequent library log message to `callback`.
///
/// Passing a null function pointer clears the callback; messages then go to
/// standard error.
///
/// # FFI contract
/// - Returns `0` on success, `-1` on internal failure.
/// - The caller keeps `callback` callable until it is replaced or the
///   process exits.
/// - A fault inside `callback` is not trapped.
#[no_mangle]
pub extern "C" fn TreeliteRegisterLogCallback(callback: LogCallback) -> c_int {
    api_guard("TreeliteRegisterLogCallback", || {
        ensure_logging();
        register_log_callback(callback)?;
        Ok(())
    })
    .code()
}

/// Returns the last error message raised on the calling thread.
///
/// # FFI contract
/// - Never null; empty string when the last call succeeded.
/// - Valid until the next API call on the same thread.
#[no_mangle]
pub extern "C" fn TreeliteGetLastError() -> *const c_char {
    last_error_ptr()
}

fn ensure_logging() {
    LOGGING_READY.get_or_init(|| {
        let requested = resolve_log_level();
        // A host that already installed a `log` logger keeps it; our records
        // then flow to that logger instead.
        if init_logging(&requested).is_err() && requested != default_log_level() {
            let _ = init_logging(default_log_level());
        }
    });
}

fn resolve_log_level() -> String {
    if let Ok(raw) = std::env::var(LOG_LEVEL_ENV) {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    default_log_level().to_string()
}
