//! Structured logging facility for Orphanage
//!
//! This crate provides:
//! - Single initialization point via `init(profile)`
//! - The diagnostic sink for ref-count transitions (`trace::emit`)
//! - `log_violation!` for precondition failures, logged before failing fast
//! - Test capture mode for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use orphanage_logging::{init, Profile};
//!
//! // Initialize once at application startup
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;
pub mod trace;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, TestCapture};
pub use trace::{emit, TraceRecord};

#[doc(hidden)]
pub mod __private {
    pub use orphanage_core_types::schema;
    pub use orphanage_errors::ExError;
    pub use tracing;
}
