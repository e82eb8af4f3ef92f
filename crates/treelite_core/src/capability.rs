//! Compile-time build capability probe.
//!
//! # Responsibility
//! - Report whether this build carries parallel-execution support.
//! - Expose a small snapshot of build facts for startup diagnostics.
//!
//! # Invariants
//! - Every value here is fixed at build time and constant for the process.
//! - Queries never fail and have no side effects.

use std::fmt::{Display, Formatter};

/// Returns `true` when the library was built with the `openmp` feature.
pub const fn parallel_support() -> bool {
    cfg!(feature = "openmp")
}

/// Integer form of [`parallel_support`] for boundary callers: `1` or `0`.
pub const fn parallel_support_flag() -> i32 {
    if parallel_support() {
        1
    } else {
        0
    }
}

/// Snapshot of facts baked into the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildCapabilities {
    pub parallel: bool,
    pub version: &'static str,
    pub build_mode: &'static str,
}

impl BuildCapabilities {
    /// Returns capabilities of the running build.
    pub const fn current() -> Self {
        Self {
            parallel: parallel_support(),
            version: env!("CARGO_PKG_VERSION"),
            build_mode: build_mode(),
        }
    }
}

impl Display for BuildCapabilities {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "parallel={} version={} build_mode={}",
            self.parallel, self.version, self.build_mode
        )
    }
}

/// `debug` or `release`, from `debug_assertions`.
pub const fn build_mode() -> &'static str {
    if cfg!(debug_assertions) {
        "debug"
    } else {
        "release"
    }
}

#[cfg(test)]
mod tests {
    use super::{parallel_support, parallel_support_flag, BuildCapabilities};

    #[test]
    fn flag_is_zero_or_one_and_stable() {
        let first = parallel_support_flag();
        assert!(first == 0 || first == 1);
        for _ in 0..16 {
            assert_eq!(parallel_support_flag(), first);
        }
    }

    #[test]
    fn flag_follows_openmp_feature() {
        assert_eq!(parallel_support(), cfg!(feature = "openmp"));
        assert_eq!(parallel_support_flag() == 1, parallel_support());
    }

    #[test]
    fn snapshot_renders_key_value_pairs() {
        let caps = BuildCapabilities::current();
        assert_eq!(caps.parallel, parallel_support());
        let rendered = caps.to_string();
        assert!(rendered.starts_with("parallel="));
        assert!(rendered.contains(&format!("version={}", env!("CARGO_PKG_VERSION"))));
    }
}
