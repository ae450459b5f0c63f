//! Orphanage Core - self-owning objects with explicit orphan signalling
//!
//! This crate provides the lifecycle primitives for objects whose destruction
//! is requested explicitly instead of happening when a handle goes out of
//! scope:
//! - `Orphanable`: the "release yourself" capability
//! - `OrphanablePtr`: the exclusive owning handle that orphans on drop
//! - `InternalRefCount` / `InternallyRefCounted`: an atomic count for objects
//!   with several concurrent holders, freed when the count reaches zero
//! - `TracedRefCount`: the same count, logging every transition through a
//!   `TraceGate`
//! - `TraceRegistry`: runtime and environment configuration of trace gates
//!
//! # Example
//!
//! ```
//! use orphanage_core::{factory, make_orphanable, Orphanable};
//! use std::ptr::NonNull;
//!
//! struct Foo {
//!     value: i32,
//! }
//!
//! impl Orphanable for Foo {
//!     unsafe fn orphan(this: NonNull<Self>) {
//!         unsafe { factory::destroy(this) }
//!     }
//! }
//!
//! let foo = make_orphanable(Foo { value: 5 });
//! assert_eq!(foo.value, 5);
//! // Dropping the handle orphans the object exactly once.
//! ```

pub mod factory;
pub mod orphanable;
pub mod ref_count;
pub mod trace_flag;
pub mod trace_registry;
mod violation;

// Re-export commonly used types
pub use orphanable::{make_orphanable, Orphanable, OrphanablePtr};
pub use orphanage_core_types::DebugLocation;
pub use orphanage_errors::{OrphanError, Result};
pub use ref_count::{InternalRefCount, InternallyRefCounted, RefCounter, RefGuard, TracedRefCount};
pub use trace_flag::{DebugOnlyTraceFlag, DisabledTraceFlag, TraceFlag, TraceGate};
pub use trace_registry::{init_from_env, TraceRegistry, TraceSpecReport, TRACE_ENV_VAR};
