//! Trace gate registry and configuration
//!
//! Gates are usually `static`s scattered across the code base. Registering
//! them here makes them addressable by name, so a comma-separated spec such
//! as `"baz,-foo"` (or the `ORPHANAGE_TRACE` environment variable) can turn
//! them on and off without a rebuild.
//!
//! Spec syntax:
//! - `name` enables the named gate, `-name` disables it
//! - `all` / `-all` apply to every registered gate
//! - whitespace around items is ignored, empty items are skipped
//!
//! Unknown names are reported and logged, never treated as fatal.

use orphanage_core_types::schema::EVENT_TRACE_CONFIG;
use orphanage_errors::{OrphanError, Result};
use std::sync::{Mutex, MutexGuard, OnceLock, PoisonError};

use crate::trace_flag::TraceGate;

/// Environment variable read by `init_from_env`
pub const TRACE_ENV_VAR: &str = "ORPHANAGE_TRACE";

const ALL_TRACERS: &str = "all";

/// Outcome of applying a trace spec
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraceSpecReport {
    pub enabled: Vec<String>,
    pub disabled: Vec<String>,
    pub unknown: Vec<String>,
}

/// Set of named trace gates
pub struct TraceRegistry {
    gates: Mutex<Vec<&'static dyn TraceGate>>,
}

impl TraceRegistry {
    /// Create an empty registry
    pub const fn new() -> Self {
        Self {
            gates: Mutex::new(Vec::new()),
        }
    }

    /// Process-wide registry used by `init_from_env`
    pub fn global() -> &'static TraceRegistry {
        static GLOBAL: OnceLock<TraceRegistry> = OnceLock::new();
        GLOBAL.get_or_init(TraceRegistry::new)
    }

    fn lock(&self) -> MutexGuard<'_, Vec<&'static dyn TraceGate>> {
        // Entries are plain references; a panic mid-update cannot leave them inconsistent.
        self.gates.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a gate
    ///
    /// Returns `false` if a gate with the same name is already registered.
    pub fn register(&self, gate: &'static dyn TraceGate) -> bool {
        let mut gates = self.lock();
        if gates.iter().any(|g| g.name() == gate.name()) {
            return false;
        }
        gates.push(gate);
        true
    }

    /// Enable or disable one gate by name
    ///
    /// # Errors
    ///
    /// Returns `OrphanError::UnknownTracer` if no gate has that name.
    pub fn set(&self, name: &str, enabled: bool) -> Result<()> {
        let gates = self.lock();
        let gate = gates
            .iter()
            .find(|g| g.name() == name)
            .ok_or_else(|| OrphanError::UnknownTracer {
                name: name.to_string(),
            })?;
        gate.set_enabled(enabled);
        Ok(())
    }

    /// Enable or disable every registered gate
    pub fn set_all(&self, enabled: bool) {
        for gate in self.lock().iter() {
            gate.set_enabled(enabled);
        }
    }

    /// Apply a comma-separated trace spec
    pub fn apply_spec(&self, spec: &str) -> TraceSpecReport {
        let mut report = TraceSpecReport::default();

        for item in spec.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (name, enabled) = match item.strip_prefix('-') {
                Some(rest) => (rest.trim(), false),
                None => (item, true),
            };
            if name.is_empty() {
                continue;
            }

            if name == ALL_TRACERS {
                self.set_all(enabled);
            } else if let Err(err) = self.set(name, enabled) {
                tracing::warn!(
                    component = module_path!(),
                    op = "apply_trace_spec",
                    event = EVENT_TRACE_CONFIG,
                    name,
                    "{}",
                    err
                );
                report.unknown.push(name.to_string());
                continue;
            }

            if enabled {
                report.enabled.push(name.to_string());
            } else {
                report.disabled.push(name.to_string());
            }
        }

        report
    }

    /// Registered gates as `(name, enabled)`, sorted by name
    pub fn list(&self) -> Vec<(&'static str, bool)> {
        let mut entries: Vec<_> = self
            .lock()
            .iter()
            .map(|g| (g.name(), g.enabled()))
            .collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        entries
    }

    /// Whether the named gate is registered and currently enabled
    pub fn is_enabled(&self, name: &str) -> bool {
        self.lock()
            .iter()
            .any(|g| g.name() == name && g.enabled())
    }
}

impl Default for TraceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Apply `ORPHANAGE_TRACE` to the global registry
///
/// Register gates first; names unknown at this point are reported. Returns
/// `None` when the variable is unset or not valid unicode.
pub fn init_from_env() -> Option<TraceSpecReport> {
    let spec = std::env::var(TRACE_ENV_VAR).ok()?;
    let report = TraceRegistry::global().apply_spec(&spec);
    tracing::info!(
        component = module_path!(),
        op = "init_from_env",
        event = EVENT_TRACE_CONFIG,
        enabled = ?report.enabled,
        disabled = ?report.disabled,
        unknown = report.unknown.len() as u64,
    );
    Some(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace_flag::{DisabledTraceFlag, TraceFlag};

    static ALPHA: TraceFlag = TraceFlag::new(false, "alpha");
    static BETA: TraceFlag = TraceFlag::new(true, "beta");
    static STRIPPED: DisabledTraceFlag = DisabledTraceFlag::new(true, "stripped");

    #[test]
    fn test_register_rejects_duplicate_names() {
        static DUP: TraceFlag = TraceFlag::new(false, "alpha");
        let registry = TraceRegistry::new();
        assert!(registry.register(&ALPHA));
        assert!(!registry.register(&DUP));
        assert_eq!(registry.list().len(), 1);
    }

    #[test]
    fn test_set_unknown_tracer_errors() {
        let registry = TraceRegistry::new();
        let err = registry.set("missing", true).unwrap_err();
        assert_eq!(
            err,
            OrphanError::UnknownTracer {
                name: "missing".to_string()
            }
        );
    }

    #[test]
    fn test_apply_spec_skips_bare_dashes() {
        let registry = TraceRegistry::new();
        registry.register(&BETA);
        let report = registry.apply_spec("-, - ,beta");
        assert!(report.unknown.is_empty());
        assert!(report.disabled.is_empty());
        assert_eq!(report.enabled, vec!["beta".to_string()]);
    }

    #[test]
    fn test_list_is_sorted_and_reports_stripped_as_disabled() {
        let registry = TraceRegistry::new();
        registry.register(&STRIPPED);
        registry.register(&BETA);
        let names: Vec<_> = registry.list().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["beta", "stripped"]);
        assert!(!registry.is_enabled("stripped"));
    }
}
