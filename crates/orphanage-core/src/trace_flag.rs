//! Named diagnostic switches
//!
//! Two implementations share the `TraceGate` interface:
//!
//! - `TraceFlag` stores its state in an atomic and can be toggled at runtime.
//! - `DisabledTraceFlag` is always off; `enabled()` is a constant `false`, so
//!   every branch guarded by it folds away.
//!
//! `DebugOnlyTraceFlag` picks one of them at build time: the live flag in
//! debug builds (or with the `debug-trace` feature), the disabled one
//! otherwise. Code declaring a debug-only tracer never changes between
//! build modes.
//!
//! ```
//! use orphanage_core::trace_flag::DEBUG_TRACE_COMPILED;
//! use orphanage_core::{DebugOnlyTraceFlag, TraceGate};
//!
//! static BAZ_TRACER: DebugOnlyTraceFlag = DebugOnlyTraceFlag::new(true, "baz");
//!
//! assert_eq!(BAZ_TRACER.name(), "baz");
//! assert_eq!(BAZ_TRACER.enabled(), DEBUG_TRACE_COMPILED);
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether `DebugOnlyTraceFlag` is the live implementation in this build
pub const DEBUG_TRACE_COMPILED: bool = cfg!(any(debug_assertions, feature = "debug-trace"));

/// A named switch controlling diagnostic output
pub trait TraceGate: Send + Sync {
    /// Name used in records and in trace configuration
    fn name(&self) -> &'static str;

    /// Whether records guarded by this gate should be emitted
    fn enabled(&self) -> bool;

    /// Turn the gate on or off
    ///
    /// Has no effect on gates compiled out of this build.
    fn set_enabled(&self, enabled: bool);
}

/// Runtime-switchable trace gate
pub struct TraceFlag {
    name: &'static str,
    value: AtomicBool,
}

impl TraceFlag {
    pub const fn new(default_enabled: bool, name: &'static str) -> Self {
        Self {
            name,
            value: AtomicBool::new(default_enabled),
        }
    }
}

impl TraceGate for TraceFlag {
    fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    fn enabled(&self) -> bool {
        self.value.load(Ordering::Relaxed)
    }

    fn set_enabled(&self, enabled: bool) {
        self.value.store(enabled, Ordering::Relaxed);
    }
}

impl fmt::Debug for TraceFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TraceFlag")
            .field("name", &self.name)
            .field("enabled", &self.enabled())
            .finish()
    }
}

/// Trace gate that is off in every configuration
///
/// Accepts the same constructor arguments as `TraceFlag` and ignores the
/// requested default.
#[derive(Debug)]
pub struct DisabledTraceFlag {
    name: &'static str,
}

impl DisabledTraceFlag {
    pub const fn new(_default_enabled: bool, name: &'static str) -> Self {
        Self { name }
    }
}

impl TraceGate for DisabledTraceFlag {
    fn name(&self) -> &'static str {
        self.name
    }

    #[inline(always)]
    fn enabled(&self) -> bool {
        false
    }

    fn set_enabled(&self, _enabled: bool) {}
}

/// Trace gate that only exists in diagnostic builds
#[cfg(any(debug_assertions, feature = "debug-trace"))]
pub type DebugOnlyTraceFlag = TraceFlag;

/// Trace gate that only exists in diagnostic builds
#[cfg(not(any(debug_assertions, feature = "debug-trace")))]
pub type DebugOnlyTraceFlag = DisabledTraceFlag;
