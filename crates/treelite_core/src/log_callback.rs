//! Process-wide registry for the foreign log callback.
//!
//! # Responsibility
//! - Hold at most one callback supplied by host code.
//! - Hand log messages to that callback from any internal call site.
//!
//! # Invariants
//! - Registering replaces the previous callback; there is no chaining.
//! - A successful `register` is visible to every later `invoke` on any thread.
//! - `invoke` never holds the lock while foreign code runs.
//! - `invoke` never fails; a fault inside the callback is not trapped.
//!
//! # Safety contract
//! The registry does not own the callback's code. Whoever registers a
//! callback must keep it callable until it is replaced or the process exits.

use once_cell::sync::OnceCell;
use std::error::Error;
use std::ffi::CString;
use std::fmt::{Display, Formatter};
use std::os::raw::c_char;
use std::sync::{PoisonError, RwLock};

/// Foreign function receiving one NUL-terminated message.
pub type LogCallbackFn = unsafe extern "C" fn(*const c_char);

/// Registered callback slot value. `None` is the "no callback" sentinel
/// (a null function pointer on the C side).
pub type LogCallback = Option<LogCallbackFn>;

static GLOBAL_REGISTRY: OnceCell<LogCallbackRegistry> = OnceCell::new();

/// Registry failures surfaced to the boundary layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
    LockPoisoned,
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::LockPoisoned => write!(f, "log callback registry lock is poisoned"),
        }
    }
}

impl Error for RegistryError {}

/// Holder of the current log callback.
#[derive(Debug, Default)]
pub struct LogCallbackRegistry {
    current: RwLock<LogCallback>,
}

impl LogCallbackRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current callback. `None` clears it.
    pub fn register(&self, callback: LogCallback) -> Result<(), RegistryError> {
        let mut slot = self
            .current
            .write()
            .map_err(|_| RegistryError::LockPoisoned)?;
        *slot = callback;
        Ok(())
    }

    /// Returns whether a callback is currently registered.
    pub fn has_callback(&self) -> bool {
        self.snapshot().is_some()
    }

    /// Calls the registered callback once with `message`.
    ///
    /// Returns `false` without any foreign call when no callback is
    /// registered; the caller decides whether to use a default sink.
    pub fn invoke(&self, message: &str) -> bool {
        let Some(callback) = self.snapshot() else {
            return false;
        };
        let text = to_c_message(message);
        // SAFETY: the registering side guarantees `callback` stays callable
        // until replaced; `text` outlives the call.
        unsafe { callback(text.as_ptr()) };
        true
    }

    fn snapshot(&self) -> LogCallback {
        // Reads recover from poisoning: the slot is a plain pointer and
        // cannot be left half-written.
        *self.current.read().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Accessor for the process-wide registry.
pub struct LogCallbackRegistryStore;

impl LogCallbackRegistryStore {
    /// Returns the process-wide registry, creating it on first access.
    pub fn get() -> &'static LogCallbackRegistry {
        GLOBAL_REGISTRY.get_or_init(LogCallbackRegistry::new)
    }
}

/// Registers `callback` on the process-wide registry.
pub fn register_log_callback(callback: LogCallback) -> Result<(), RegistryError> {
    LogCallbackRegistryStore::get().register(callback)
}

/// Returns whether the process-wide registry holds a callback.
pub fn log_callback_registered() -> bool {
    LogCallbackRegistryStore::get().has_callback()
}

/// Invokes the process-wide callback, if any.
pub fn invoke_log_callback(message: &str) -> bool {
    LogCallbackRegistryStore::get().invoke(message)
}

fn to_c_message(message: &str) -> CString {
    if message.contains('\0') {
        CString::new(message.replace('\0', " ")).unwrap_or_default()
    } else {
        CString::new(message).unwrap_or_default()
    }
}
