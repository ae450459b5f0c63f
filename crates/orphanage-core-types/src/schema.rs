//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Tracing target for ref-count transitions
pub const TARGET_REFCOUNT: &str = "orphanage::refcount";

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";

// Ref-count trace fields
pub const FIELD_TRACER: &str = "tracer";
pub const FIELD_ENTITY: &str = "entity";
pub const FIELD_PRIOR: &str = "prior";
pub const FIELD_COUNT: &str = "count";
pub const FIELD_REASON: &str = "reason";
pub const FIELD_LOCATION: &str = "location";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_REFCOUNT: &str = "refcount";
pub const EVENT_VIOLATION: &str = "violation";
pub const EVENT_TRACE_CONFIG: &str = "trace_config";
