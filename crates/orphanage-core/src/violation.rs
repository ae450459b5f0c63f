//! Fail-fast handling of lifecycle precondition violations

use orphanage_errors::{ExError, OrphanError};
use orphanage_logging::log_violation;

/// Log a broken lifecycle contract and panic
///
/// Double orphans, increments after zero and empty-handle access are caller
/// bugs; continuing would only hide them.
#[cold]
#[track_caller]
pub(crate) fn fail_fast(err: OrphanError) -> ! {
    let ex_err: ExError = err.into();
    log_violation!(ex_err);
    panic!("{}", ex_err)
}
