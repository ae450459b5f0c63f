//! Internal reference counting for orphanable objects
//!
//! An internally ref-counted object embeds a counter that starts at one: the
//! implicit creation reference owned by whoever holds the `OrphanablePtr`.
//! Other holders add and release their own references, typically through a
//! `RefGuard`. Orphaning releases the creation reference, and whichever
//! release takes the count to zero frees the object.
//!
//! ```
//! use orphanage_core::{
//!     make_orphanable, InternalRefCount, InternallyRefCounted, Orphanable,
//! };
//! use std::ptr::NonNull;
//!
//! struct Bar {
//!     refs: InternalRefCount,
//!     value: i32,
//! }
//!
//! impl Orphanable for Bar {
//!     unsafe fn orphan(this: NonNull<Self>) {
//!         unsafe { Self::release_ref(this, None) }
//!     }
//! }
//!
//! unsafe impl InternallyRefCounted for Bar {
//!     type Counter = InternalRefCount;
//!
//!     fn ref_counter(&self) -> &InternalRefCount {
//!         &self.refs
//!     }
//! }
//!
//! let bar = make_orphanable(Bar { refs: InternalRefCount::new(), value: 0 });
//! let work = bar.take_ref();
//! drop(bar); // orphaned, but `work` keeps it alive
//! assert_eq!(work.value, 0);
//! drop(work); // last reference: freed here
//! ```
//!
//! Guards come only from an owning handle or from another guard, so the
//! object behind a guard is always one the factory allocated. A borrowed
//! object cannot mint one:
//!
//! ```compile_fail
//! # use orphanage_core::{InternalRefCount, InternallyRefCounted, Orphanable};
//! # use std::ptr::NonNull;
//! # struct Bar { refs: InternalRefCount }
//! # impl Orphanable for Bar {
//! #     unsafe fn orphan(this: NonNull<Self>) { unsafe { Self::release_ref(this, None) } }
//! # }
//! # unsafe impl InternallyRefCounted for Bar {
//! #     type Counter = InternalRefCount;
//! #     fn ref_counter(&self) -> &InternalRefCount { &self.refs }
//! # }
//! let guard = {
//!     let bar = Bar { refs: InternalRefCount::new() };
//!     bar.take_ref()
//! };
//! ```
//!
//! Ref-counted objects are shared between holders, so they must be `Sync`:
//!
//! ```compile_fail
//! # use orphanage_core::{InternalRefCount, InternallyRefCounted, Orphanable};
//! # use std::cell::Cell;
//! # use std::ptr::NonNull;
//! struct Hits {
//!     refs: InternalRefCount,
//!     hits: Cell<u64>,
//! }
//! # impl Orphanable for Hits {
//! #     unsafe fn orphan(this: NonNull<Self>) { unsafe { Self::release_ref(this, None) } }
//! # }
//! unsafe impl InternallyRefCounted for Hits {
//!     type Counter = InternalRefCount;
//!     fn ref_counter(&self) -> &InternalRefCount { &self.refs }
//! }
//! ```

use std::fmt;
use std::ops::Deref;
use std::ptr::NonNull;
use std::sync::atomic::{self, AtomicUsize, Ordering};

use orphanage_core_types::{DebugLocation, RefOp};
use orphanage_errors::OrphanError;
use orphanage_logging::trace::{emit, TraceRecord};

use crate::factory;
use crate::orphanable::{Orphanable, OrphanablePtr};
use crate::trace_flag::{DebugOnlyTraceFlag, TraceGate};
use crate::violation::fail_fast;

/// Atomic reference counter embedded in a ref-counted object
pub trait RefCounter: Send + Sync {
    /// Register one more holder
    ///
    /// The caller must already hold a reference; incrementing a count that
    /// reached zero fails fast.
    fn increment(&self, location: DebugLocation, reason: Option<&str>);

    /// Release one holder
    ///
    /// Returns `true` when this call released the last reference. After a
    /// `true` result the only valid use of the enclosing object is to
    /// destroy it. After `false`, the caller must not touch it at all.
    #[must_use = "the caller that releases the last reference must destroy the object"]
    fn decrement(&self, location: DebugLocation, reason: Option<&str>) -> bool;

    /// Relaxed snapshot of the current count
    fn count(&self) -> usize;
}

/// Untraced atomic count, initialised to one
pub struct InternalRefCount {
    count: AtomicUsize,
}

impl InternalRefCount {
    pub const fn new() -> Self {
        Self {
            count: AtomicUsize::new(1),
        }
    }

    fn address(&self) -> usize {
        self as *const Self as usize
    }

    /// Increment and return the prior value
    #[track_caller]
    fn fetch_increment(&self) -> usize {
        let prior = self.count.fetch_add(1, Ordering::Relaxed);
        if prior == 0 {
            fail_fast(OrphanError::IncrementAfterZero {
                entity: format!("{:#x}", self.address()),
            });
        }
        prior
    }

    /// Decrement and return the prior value
    ///
    /// A prior value of one means the object is now unreachable; `self` must
    /// not be used again by this caller.
    #[track_caller]
    fn fetch_decrement(&self) -> usize {
        let entity = self.address();
        let prior = self.count.fetch_sub(1, Ordering::Release);
        if prior == 1 {
            // Pairs with the release above on every other holder's decrement.
            atomic::fence(Ordering::Acquire);
        } else if prior == 0 {
            fail_fast(OrphanError::DecrementAfterZero {
                entity: format!("{:#x}", entity),
            });
        }
        prior
    }
}

impl RefCounter for InternalRefCount {
    #[track_caller]
    fn increment(&self, _location: DebugLocation, _reason: Option<&str>) {
        self.fetch_increment();
    }

    #[track_caller]
    fn decrement(&self, _location: DebugLocation, _reason: Option<&str>) -> bool {
        self.fetch_decrement() == 1
    }

    fn count(&self) -> usize {
        self.count.load(Ordering::Relaxed)
    }
}

impl Default for InternalRefCount {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InternalRefCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InternalRefCount")
            .field("count", &self.count())
            .finish()
    }
}

/// Ref count that records every transition while its gate is enabled
///
/// Lifecycle behaviour is identical to `InternalRefCount`. With a disabled
/// gate nothing is recorded; with `DisabledTraceFlag` the check itself
/// compiles away.
pub struct TracedRefCount<G: TraceGate + 'static = DebugOnlyTraceFlag> {
    inner: InternalRefCount,
    gate: &'static G,
}

impl<G: TraceGate + 'static> TracedRefCount<G> {
    pub const fn new(gate: &'static G) -> Self {
        Self {
            inner: InternalRefCount::new(),
            gate,
        }
    }
}

impl<G: TraceGate + 'static> RefCounter for TracedRefCount<G> {
    #[track_caller]
    fn increment(&self, location: DebugLocation, reason: Option<&str>) {
        let prior = self.inner.fetch_increment();
        if self.gate.enabled() {
            emit(&TraceRecord {
                tracer: self.gate.name(),
                entity: self.inner.address(),
                op: RefOp::Increment,
                prior,
                count: prior + 1,
                reason,
                location,
            });
        }
    }

    #[track_caller]
    fn decrement(&self, location: DebugLocation, reason: Option<&str>) -> bool {
        // Everything the record needs is read up front: once the count drops,
        // another holder may free `self`.
        let gate = self.gate;
        let entity = self.inner.address();
        let prior = self.inner.fetch_decrement();
        if gate.enabled() {
            emit(&TraceRecord {
                tracer: gate.name(),
                entity,
                op: RefOp::Decrement,
                prior,
                count: prior - 1,
                reason,
                location,
            });
        }
        prior == 1
    }

    fn count(&self) -> usize {
        self.inner.count()
    }
}

impl<G: TraceGate + 'static> fmt::Debug for TracedRefCount<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracedRefCount")
            .field("tracer", &self.gate.name())
            .field("count", &self.count())
            .finish()
    }
}

/// An orphanable object whose lifetime is governed by an embedded counter
///
/// `Orphanable::orphan` should release the creation reference:
/// `unsafe { Self::release_ref(this, None) }`.
///
/// # Safety
///
/// Implementors guarantee that `ref_counter` always returns the same counter,
/// embedded in `self`, and that `orphan` releases exactly one reference.
/// The last release frees the object with `factory::destroy`; safe code only
/// reaches it through `OrphanablePtr` and `RefGuard`, which hold factory
/// allocations.
pub unsafe trait InternallyRefCounted: Orphanable + Sync + Sized {
    type Counter: RefCounter;

    fn ref_counter(&self) -> &Self::Counter;

    /// Add a reference on behalf of a new holder
    #[track_caller]
    fn add_ref(&self) {
        self.ref_counter().increment(DebugLocation::caller(), None);
    }

    /// Add a reference, recording why
    #[track_caller]
    fn add_ref_with_reason(&self, reason: &str) {
        self.ref_counter()
            .increment(DebugLocation::caller(), Some(reason));
    }

    /// Release one reference, destroying the object if it was the last
    ///
    /// # Safety
    ///
    /// `this` must point to a live instance and the caller must own one of
    /// its references, which this call consumes. The caller must not use
    /// `this` afterwards.
    #[track_caller]
    unsafe fn release_ref(this: NonNull<Self>, reason: Option<&str>) {
        let location = DebugLocation::caller();
        // SAFETY: the caller's reference keeps the object alive until this decrement.
        let last = unsafe { this.as_ref() }
            .ref_counter()
            .decrement(location, reason);
        if last {
            // SAFETY: this call took the count to zero, so no holder can reach the object.
            unsafe { factory::destroy(this) }
        }
    }
}

impl<T: InternallyRefCounted> OrphanablePtr<T> {
    /// Add a reference owned by the returned guard
    ///
    /// Fails fast on an empty handle.
    #[track_caller]
    pub fn take_ref(&self) -> RefGuard<T> {
        RefGuard::acquire(self.owned(), None)
    }

    /// Add a reference owned by the returned guard, recording why
    ///
    /// The same reason is recorded when the guard releases it.
    #[track_caller]
    pub fn take_ref_with_reason(&self, reason: &'static str) -> RefGuard<T> {
        RefGuard::acquire(self.owned(), Some(reason))
    }

    #[track_caller]
    fn owned(&self) -> NonNull<T> {
        match self.as_ptr() {
            Some(ptr) => ptr,
            None => fail_fast(OrphanError::NullHandle),
        }
    }
}

/// One counted reference to an internally ref-counted object
///
/// Taken from an `OrphanablePtr` or cloned from another guard. Dropping the
/// guard releases the reference. Guards can move to other threads when the
/// object is `Send`.
pub struct RefGuard<T: InternallyRefCounted> {
    ptr: NonNull<T>,
    reason: Option<&'static str>,
    location: DebugLocation,
}

// SAFETY: a guard is a shared reference with a refcount, like `Arc<T>`.
unsafe impl<T: InternallyRefCounted + Send> Send for RefGuard<T> {}
// SAFETY: as above; `InternallyRefCounted` already implies `Sync`.
unsafe impl<T: InternallyRefCounted + Send> Sync for RefGuard<T> {}

impl<T: InternallyRefCounted> RefGuard<T> {
    /// `ptr` must be a factory allocation kept alive by a handle or guard.
    #[track_caller]
    fn acquire(ptr: NonNull<T>, reason: Option<&'static str>) -> Self {
        let location = DebugLocation::caller();
        // SAFETY: the caller's handle or guard keeps the object alive.
        unsafe { ptr.as_ref() }
            .ref_counter()
            .increment(location, reason);
        Self {
            ptr,
            reason,
            location,
        }
    }

    /// Release the reference now, recording the caller's location
    #[track_caller]
    pub fn release(self) {
        let this = std::mem::ManuallyDrop::new(self);
        // SAFETY: the guard owns one reference and is never used again.
        unsafe { T::release_ref(this.ptr, this.reason) }
    }

    /// Where the reference was taken
    pub fn location(&self) -> DebugLocation {
        self.location
    }

    pub fn reason(&self) -> Option<&'static str> {
        self.reason
    }
}

impl<T: InternallyRefCounted> Deref for RefGuard<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: the guard's reference keeps the object alive.
        unsafe { self.ptr.as_ref() }
    }
}

impl<T: InternallyRefCounted> Clone for RefGuard<T> {
    #[track_caller]
    fn clone(&self) -> Self {
        RefGuard::acquire(self.ptr, self.reason)
    }
}

impl<T: InternallyRefCounted> Drop for RefGuard<T> {
    fn drop(&mut self) {
        let location = self.location;
        let reason = self.reason;
        // SAFETY: the guard owns one reference; `self.ptr` is not used after this.
        let last = unsafe { self.ptr.as_ref() }
            .ref_counter()
            .decrement(location, reason);
        if last {
            // SAFETY: this release took the count to zero.
            unsafe { factory::destroy(self.ptr) }
        }
    }
}

impl<T: InternallyRefCounted + fmt::Debug> fmt::Debug for RefGuard<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefGuard")
            .field("target", &**self)
            .field("reason", &self.reason)
            .finish()
    }
}
