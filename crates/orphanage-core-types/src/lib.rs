//! Core types shared across Orphanage facilities
//!
//! This crate provides foundational types used by the error, logging and
//! lifecycle crates:
//!
//! - **Call-site tokens**: `DebugLocation`, captured with `#[track_caller]`
//! - **Ref-count operations**: `RefOp` naming each count transition
//! - **Schema constants**: Canonical field keys and event names

pub mod location;
pub mod ref_op;
pub mod schema;

pub use location::DebugLocation;
pub use ref_op::RefOp;
