//! Ref-count operation names

use serde::Serialize;
use std::fmt;

/// A single transition of an internal reference count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RefOp {
    /// A holder registered interest
    Increment,
    /// A holder released interest
    Decrement,
}

impl RefOp {
    /// Stable name used in log records
    pub fn as_str(&self) -> &'static str {
        match self {
            RefOp::Increment => "increment",
            RefOp::Decrement => "decrement",
        }
    }
}

impl fmt::Display for RefOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
