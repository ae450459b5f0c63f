//! Canonical logging macros

/// Log a lifecycle precondition violation
///
/// Takes any expression evaluating to an `ExError` and records it at error
/// level with its kind and stable code. The error is borrowed, so callers can
/// still use it (typically to panic with the same text).
///
/// # Example
///
/// ```
/// # use orphanage_logging::log_violation;
/// use orphanage_errors::{ExError, OrphanError};
///
/// let err: ExError = OrphanError::NullHandle.into();
/// log_violation!(err);
/// ```
#[macro_export]
macro_rules! log_violation {
    ($err:expr) => {{
        let ex_err: &$crate::__private::ExError = &$err;
        $crate::__private::tracing::error!(
            component = module_path!(),
            op = ex_err.op().unwrap_or("unknown"),
            event = $crate::__private::schema::EVENT_VIOLATION,
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            entity = ex_err.entity(),
            detail = ex_err.message(),
        );
    }};
}
