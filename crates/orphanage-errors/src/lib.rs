//! Error facility for Orphanage
//!
//! Lifecycle errors in this workspace are almost all precondition
//! violations: they describe a caller bug, not a transient failure. The
//! taxonomy still gets stable codes so violations can be logged, matched in
//! tests and rendered consistently before the process fails fast.

use thiserror::Error;

/// Result type alias using OrphanError
pub type Result<T> = std::result::Result<T, OrphanError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code used in structured logs and panic
/// messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Handle misuse
    NullHandle,

    // Ref-count misuse
    IncrementAfterZero,
    DecrementAfterZero,

    // Trace configuration
    UnknownTracer,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::NullHandle => "ERR_NULL_HANDLE",
            ExErrorKind::IncrementAfterZero => "ERR_INCREMENT_AFTER_ZERO",
            ExErrorKind::DecrementAfterZero => "ERR_DECREMENT_AFTER_ZERO",
            ExErrorKind::UnknownTracer => "ERR_UNKNOWN_TRACER",
        }
    }

    /// Whether this kind marks a broken caller contract
    ///
    /// Precondition violations are never retried or recovered from.
    pub fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            ExErrorKind::NullHandle
                | ExErrorKind::IncrementAfterZero
                | ExErrorKind::DecrementAfterZero
        )
    }
}

/// Canonical structured error type
///
/// Carries the classification plus enough context (operation, entity) to
/// find the offending object in a trace.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entity context (usually the entity's address)
    pub fn with_entity(mut self, entity: impl Into<String>) -> Self {
        self.entity = Some(entity.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entity context, if any
    pub fn entity(&self) -> Option<&str> {
        self.entity.as_deref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity) = &self.entity {
            write!(f, " (entity: {})", entity)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Lifecycle error taxonomy
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OrphanError {
    /// An empty owning handle was dereferenced
    #[error("Access through an empty orphanable handle")]
    NullHandle,

    /// A reference was added to an entity whose count already reached zero
    #[error("Increment of a ref count that already reached zero (entity {entity})")]
    IncrementAfterZero { entity: String },

    /// A reference was released from an entity whose count already reached zero
    #[error("Decrement of a ref count that already reached zero (entity {entity}); double orphan?")]
    DecrementAfterZero { entity: String },

    /// A trace configuration named a tracer nobody registered
    #[error("Unknown tracer: {name}")]
    UnknownTracer { name: String },
}

impl OrphanError {
    /// Classification of this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            OrphanError::NullHandle => ExErrorKind::NullHandle,
            OrphanError::IncrementAfterZero { .. } => ExErrorKind::IncrementAfterZero,
            OrphanError::DecrementAfterZero { .. } => ExErrorKind::DecrementAfterZero,
            OrphanError::UnknownTracer { .. } => ExErrorKind::UnknownTracer,
        }
    }
}

impl From<OrphanError> for ExError {
    fn from(err: OrphanError) -> Self {
        let ex = ExError::new(err.kind()).with_message(err.to_string());
        match err {
            OrphanError::NullHandle => ex.with_op("deref"),
            OrphanError::IncrementAfterZero { entity } => {
                ex.with_op("increment").with_entity(entity)
            }
            OrphanError::DecrementAfterZero { entity } => {
                ex.with_op("decrement").with_entity(entity)
            }
            OrphanError::UnknownTracer { name } => ex.with_op("configure_tracers").with_entity(name),
        }
    }
}
