//! C-linkage boundary of the treelite common API.
//!
//! Every status-returning entry point runs through [`api_guard::api_guard`],
//! so internal failures surface as an integer status plus a per-thread
//! message instead of unwinding into host code.

pub mod api;
pub mod api_guard;

pub use api::{TreeliteGetLastError, TreeliteOpenMPSupported, TreeliteRegisterLogCallback};
pub use api_guard::{api_guard, last_error_message, ApiError, Status};
