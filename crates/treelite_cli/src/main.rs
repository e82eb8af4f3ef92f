//! CLI smoke entry point.
//!
//! # Responsibility
//! - Print the build capabilities baked into `treelite_core`.
//! - Exercise the log callback path end to end without a foreign host.

use log::info;
use std::ffi::CStr;
use std::os::raw::c_char;
use std::process::ExitCode;
use treelite_core::{default_log_level, init_logging, register_log_callback, BuildCapabilities};

unsafe extern "C" fn print_to_stdout(message: *const c_char) {
    println!("[callback] {}", CStr::from_ptr(message).to_string_lossy());
}

fn main() -> ExitCode {
    println!("treelite_core {}", BuildCapabilities::current());

    if let Err(err) = init_logging(default_log_level()) {
        eprintln!("logging init failed: {err}");
        return ExitCode::FAILURE;
    }
    if let Err(err) = register_log_callback(Some(print_to_stdout)) {
        eprintln!("log callback registration failed: {err}");
        return ExitCode::FAILURE;
    }

    info!("event=cli_probe module=cli status=ok");
    ExitCode::SUCCESS
}
