//! Diagnostic sink for ref-count transitions
//!
//! Every traced increment or decrement becomes one `TraceRecord`, emitted as
//! a debug-level `tracing` event on the `orphanage::refcount` target. Where
//! the record ends up (console, JSON pipeline, test capture) is the installed
//! subscriber's business. Emission cannot fail.

use orphanage_core_types::schema::{EVENT_REFCOUNT, TARGET_REFCOUNT};
use orphanage_core_types::{DebugLocation, RefOp};
use serde::Serialize;

/// One observed ref-count transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraceRecord<'a> {
    /// Name of the gate that allowed the record
    pub tracer: &'static str,
    /// Address of the counter, stable for the entity's lifetime
    pub entity: usize,
    pub op: RefOp,
    /// Count observed before the transition
    pub prior: usize,
    /// Count after the transition
    pub count: usize,
    pub reason: Option<&'a str>,
    pub location: DebugLocation,
}

impl TraceRecord<'_> {
    /// Entity address in the `0x...` form used by logs
    pub fn entity_hex(&self) -> String {
        format!("{:#x}", self.entity)
    }
}

/// Emit a record to the diagnostic sink
pub fn emit(record: &TraceRecord<'_>) {
    let entity = record.entity_hex();
    tracing::debug!(
        target: TARGET_REFCOUNT,
        component = "refcount",
        op = record.op.as_str(),
        event = EVENT_REFCOUNT,
        tracer = record.tracer,
        entity = entity.as_str(),
        prior = record.prior as u64,
        count = record.count as u64,
        reason = record.reason,
        location = %record.location,
        "{}:{} {} {} -> {} {}",
        record.tracer,
        entity,
        record.op,
        record.prior,
        record.count,
        record.reason.unwrap_or(""),
    );
}
