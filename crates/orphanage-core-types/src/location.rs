//! Call-site tokens for diagnostic records
//!
//! A `DebugLocation` identifies the source line that performed a ref-count
//! transition. It is captured through `#[track_caller]`, so callers never
//! spell out `file!()`/`line!()` themselves.

use serde::Serialize;
use std::fmt;
use std::panic::Location;

/// Source location of a lifecycle call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DebugLocation {
    file: &'static str,
    line: u32,
}

impl DebugLocation {
    /// Create a location from explicit parts
    pub const fn new(file: &'static str, line: u32) -> Self {
        Self { file, line }
    }

    /// Capture the location of the caller
    ///
    /// Propagates through every `#[track_caller]` frame above it, so the
    /// recorded line is the first untracked call site.
    #[track_caller]
    pub fn caller() -> Self {
        let location = Location::caller();
        Self {
            file: location.file(),
            line: location.line(),
        }
    }

    /// Source file path
    pub fn file(&self) -> &'static str {
        self.file
    }

    /// Line number within `file`
    pub fn line(&self) -> u32 {
        self.line
    }
}

impl fmt::Display for DebugLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
