//! Boundary error adapter shared by every exported entry point.
//!
//! # Responsibility
//! - Run entry point bodies in a guarded region.
//! - Convert errors and panics into a status code plus a per-thread message.
//!
//! # Invariants
//! - No panic unwinds out of an `api_guard` call.
//! - The last-error slot is cleared on entry and set only on failure.
//! - Guarding relies on unwinding; a `panic = "abort"` build aborts instead.

use log::error;
use std::any::Any;
use std::cell::RefCell;
use std::error::Error;
use std::ffi::CString;
use std::fmt::{Display, Formatter};
use std::os::raw::{c_char, c_int};
use std::panic::{self, AssertUnwindSafe};
use treelite_core::logging::sanitize_message;
use treelite_core::RegistryError;

const MAX_ERROR_MESSAGE_CHARS: usize = 512;

thread_local! {
    static LAST_ERROR: RefCell<CString> = RefCell::new(CString::default());
}

/// Integer status returned across the boundary.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok = 0,
    InternalError = -1,
}

impl Status {
    pub fn code(self) -> c_int {
        self as c_int
    }
}

/// Internal failures caught at the boundary.
#[derive(Debug)]
pub enum ApiError {
    Registry(RegistryError),
    Panic(String),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Registry(err) => write!(f, "{err}"),
            Self::Panic(message) => write!(f, "internal panic: {message}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Registry(err) => Some(err),
            Self::Panic(_) => None,
        }
    }
}

impl From<RegistryError> for ApiError {
    fn from(value: RegistryError) -> Self {
        Self::Registry(value)
    }
}

/// Runs `body` for `entry_point` and maps its outcome to a [`Status`].
pub fn api_guard<F>(entry_point: &str, body: F) -> Status
where
    F: FnOnce() -> Result<(), ApiError>,
{
    clear_last_error();

    let outcome = match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(result) => result,
        Err(payload) => Err(ApiError::Panic(panic_message(payload.as_ref()))),
    };

    match outcome {
        Ok(()) => Status::Ok,
        Err(err) => {
            error!(
                "event=api_error module=ffi status=error entry_point={} error={}",
                entry_point, err
            );
            set_last_error(&err.to_string());
            Status::InternalError
        }
    }
}

/// Pointer to this thread's last error text; empty when the last call
/// succeeded. Valid until the next guarded call on the same thread.
pub fn last_error_ptr() -> *const c_char {
    LAST_ERROR.with(|slot| slot.borrow().as_ptr())
}

/// Owned copy of this thread's last error text.
pub fn last_error_message() -> String {
    LAST_ERROR.with(|slot| slot.borrow().to_string_lossy().into_owned())
}

fn set_last_error(message: &str) {
    let flattened = sanitize_message(message, MAX_ERROR_MESSAGE_CHARS).replace('\0', " ");
    let text = CString::new(flattened).unwrap_or_default();
    LAST_ERROR.with(|slot| *slot.borrow_mut() = text);
}

fn clear_last_error() {
    LAST_ERROR.with(|slot| *slot.borrow_mut() = CString::default());
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
