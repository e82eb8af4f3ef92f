//! Core logging bootstrap and callback bridge.
//!
//! # Responsibility
//! - Route `log` facade records from any internal call site to the
//!   registered foreign callback.
//! - Fall back to standard error when no callback is registered.
//! - Report panics raised inside the library through the same path.
//!
//! # Invariants
//! - Logging init is idempotent for the same level.
//! - Re-initialization with a different level is rejected.
//! - Logging initialization must not panic.
//!
//! # See also
//! - crate::log_callback

use crate::capability::BuildCapabilities;
use crate::log_callback::{LogCallbackRegistry, LogCallbackRegistryStore};
use flexi_logger::writers::LogWriter;
use flexi_logger::{DeferredNow, FormatFunction, Logger, LoggerHandle};
use log::{error, info, Record};
use once_cell::sync::OnceCell;
use std::io::Write;

const MAX_PANIC_PAYLOAD_CHARS: usize = 160;

static LOGGING_STATE: OnceCell<LoggingState> = OnceCell::new();
static PANIC_HOOK_INSTALLED: OnceCell<()> = OnceCell::new();

struct LoggingState {
    level: &'static str,
    _logger: LoggerHandle,
}

/// Initializes core logging at `level`, forwarding records to the
/// process-wide log callback registry.
///
/// # Errors
/// - Returns an error when `level` is unsupported.
/// - Returns an error when logging is already active at another level.
/// - Returns an error when logger backend setup fails (for example when the
///   host process already installed a `log` logger).
pub fn init_logging(level: &str) -> Result<(), String> {
    let normalized_level = normalize_level(level)?;

    let state = LOGGING_STATE.get_or_try_init(|| -> Result<LoggingState, String> {
        let logger = Logger::try_with_str(normalized_level)
            .map_err(|err| format!("invalid log level `{normalized_level}`: {err}"))?
            .log_to_writer(Box::new(CallbackLogWriter::new(
                LogCallbackRegistryStore::get(),
            )))
            .start()
            .map_err(|err| format!("failed to start logger: {err}"))?;

        install_panic_hook_once();

        info!(
            "event=core_init module=core status=ok level={} platform={} {}",
            normalized_level,
            std::env::consts::OS,
            BuildCapabilities::current()
        );

        Ok(LoggingState {
            level: normalized_level,
            _logger: logger,
        })
    })?;

    if state.level != normalized_level {
        return Err(format!(
            "logging already initialized with level `{}`; refusing to switch to `{}`",
            state.level, normalized_level
        ));
    }

    Ok(())
}

/// Returns the active level, or `None` when logging has not been initialized.
pub fn logging_status() -> Option<&'static str> {
    LOGGING_STATE.get().map(|state| state.level)
}

/// Returns the default log level for current build mode.
///
/// - `debug` builds -> `debug`
/// - `release` builds -> `info`
pub fn default_log_level() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    }
}

/// Delivers one rendered message to the registered callback, or to standard
/// error when none is registered.
pub fn emit_log_message(message: &str) {
    emit_to(LogCallbackRegistryStore::get(), message);
}

fn emit_to(registry: &LogCallbackRegistry, message: &str) {
    if !registry.invoke(message) {
        let _ = writeln!(std::io::stderr().lock(), "{message}");
    }
}

/// `flexi_logger` writer that renders each record to one line and hands it
/// to a log callback registry.
pub struct CallbackLogWriter {
    registry: &'static LogCallbackRegistry,
    format: FormatFunction,
}

impl CallbackLogWriter {
    pub fn new(registry: &'static LogCallbackRegistry) -> Self {
        Self {
            registry,
            format: flexi_logger::default_format,
        }
    }
}

impl LogWriter for CallbackLogWriter {
    fn write(&self, now: &mut DeferredNow, record: &Record) -> std::io::Result<()> {
        let mut buffer = Vec::with_capacity(128);
        (self.format)(&mut buffer, now, record)?;
        let message = String::from_utf8_lossy(&buffer);
        emit_to(self.registry, message.trim_end_matches(['\n', '\r']));
        Ok(())
    }

    fn flush(&self) -> std::io::Result<()> {
        Ok(())
    }

    fn format(&mut self, format: FormatFunction) {
        self.format = format;
    }
}

fn normalize_level(level: &str) -> Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" => Ok("off"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error|off"
        )),
    }
}

fn install_panic_hook_once() {
    if PANIC_HOOK_INSTALLED.get().is_some() {
        return;
    }

    let previous_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}", loc.file(), loc.line()))
            .unwrap_or_else(|| "unknown".to_string());
        let payload = panic_payload_summary(panic_info);
        error!(
            "event=panic_captured module=core status=error location={} payload={}",
            location, payload
        );
        previous_hook(panic_info);
    }));

    let _ = PANIC_HOOK_INSTALLED.set(());
}

fn panic_payload_summary(info: &std::panic::PanicHookInfo<'_>) -> String {
    let payload = if let Some(message) = info.payload().downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = info.payload().downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    };

    sanitize_message(&payload, MAX_PANIC_PAYLOAD_CHARS)
}

/// Flattens `value` to one line of at most `max_chars` characters.
pub fn sanitize_message(value: &str, max_chars: usize) -> String {
    let normalized = value.replace(['\n', '\r'], " ");
    let mut truncated = normalized.chars().take(max_chars).collect::<String>();
    if normalized.chars().count() > max_chars {
        truncated.push_str("...");
    }
    truncated
}

#[cfg(test)]
mod tests {
    use super::{
        emit_to, init_logging, logging_status, normalize_level, sanitize_message,
        CallbackLogWriter,
    };
    use crate::log_callback::LogCallbackRegistry;
    use flexi_logger::writers::LogWriter;
    use flexi_logger::DeferredNow;
    use log::{Level, Record};
    use std::ffi::CStr;
    use std::os::raw::c_char;
    use std::sync::Mutex;

    static WRITER_MESSAGES: Mutex<Vec<String>> = Mutex::new(Vec::new());
    static EMITTED_MESSAGES: Mutex<Vec<String>> = Mutex::new(Vec::new());

    unsafe extern "C" fn capture_writer(message: *const c_char) {
        let text = CStr::from_ptr(message).to_string_lossy().into_owned();
        WRITER_MESSAGES.lock().expect("writer buffer lock").push(text);
    }

    unsafe extern "C" fn capture_emitted(message: *const c_char) {
        let text = CStr::from_ptr(message).to_string_lossy().into_owned();
        EMITTED_MESSAGES
            .lock()
            .expect("emitted buffer lock")
            .push(text);
    }

    fn leaked_registry() -> &'static LogCallbackRegistry {
        Box::leak(Box::new(LogCallbackRegistry::new()))
    }

    #[test]
    fn normalize_level_accepts_known_values() {
        assert_eq!(
            normalize_level("INFO").expect("INFO should normalize"),
            "info"
        );
        assert_eq!(
            normalize_level(" warning ").expect("warning should normalize"),
            "warn"
        );
    }

    #[test]
    fn normalize_level_rejects_unknown_values() {
        let error = normalize_level("verbose").expect_err("verbose must be rejected");
        assert!(error.contains("unsupported log level"));
    }

    #[test]
    fn sanitize_message_removes_newlines_and_truncates() {
        let sanitized = sanitize_message("line1\nline2\rline3", 8);
        assert!(!sanitized.contains('\n'));
        assert!(!sanitized.contains('\r'));
        assert!(sanitized.ends_with("..."));
    }

    #[test]
    fn emit_prefers_registered_callback() {
        let registry = LogCallbackRegistry::new();
        emit_to(&registry, "to stderr");
        registry
            .register(Some(capture_emitted))
            .expect("register capture");
        emit_to(&registry, "a");
        emit_to(&registry, "b");
        emit_to(&registry, "c");

        let emitted = EMITTED_MESSAGES.lock().expect("emitted buffer lock");
        assert_eq!(*emitted, vec!["a", "b", "c"]);
    }

    #[test]
    fn writer_forwards_rendered_record_to_callback() {
        let registry = leaked_registry();
        registry
            .register(Some(capture_writer))
            .expect("register capture");
        let writer = CallbackLogWriter::new(registry);
        let mut now = DeferredNow::new();

        writer
            .write(
                &mut now,
                &Record::builder()
                    .args(format_args!("loaded {} trees", 3))
                    .level(Level::Warn)
                    .module_path(Some("treelite_core::model"))
                    .build(),
            )
            .expect("write record");

        let messages = WRITER_MESSAGES.lock().expect("writer buffer lock");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("WARN"));
        assert!(messages[0].contains("loaded 3 trees"));
        assert!(!messages[0].ends_with('\n'));
    }

    #[test]
    fn init_logging_is_idempotent_for_same_level_and_rejects_conflicts() {
        init_logging("info").expect("first init should succeed");
        init_logging("INFO").expect("same level should be idempotent");

        let error = init_logging("debug").expect_err("level conflict should fail");
        assert!(error.contains("refusing to switch"));
        assert_eq!(logging_status(), Some("info"));
    }
}
