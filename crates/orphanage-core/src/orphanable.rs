//! Orphanable objects and their exclusive owning handle
//!
//! An `Orphanable` object is never dropped by whoever holds it. Instead the
//! holder *orphans* it, and the object decides when its storage can go:
//! immediately for plain objects, or once the last internal reference is
//! released for ref-counted ones.
//!
//! `OrphanablePtr` is the single owner. Dropping, resetting or overwriting a
//! non-empty handle orphans the referent exactly once; moving it does not.

use std::fmt;
use std::marker::PhantomData;
use std::mem::ManuallyDrop;
use std::ops::Deref;
use std::ptr::NonNull;

use orphanage_errors::{OrphanError, Result};

use crate::factory;
use crate::violation::fail_fast;

/// Capability of receiving an explicit "release yourself" signal
///
/// Plain objects free themselves with `factory::destroy`; ref-counted ones
/// release their creation reference (see `InternallyRefCounted`).
pub trait Orphanable {
    /// Give up the owning reference and let the object schedule its own
    /// destruction
    ///
    /// # Safety
    ///
    /// `this` must point to a live object allocated by `factory::create`,
    /// the caller must hold the owning reference, and this must be the only
    /// orphan call for the object. Orphaning twice is a caller bug; the
    /// owner must not touch the object afterwards.
    unsafe fn orphan(this: NonNull<Self>);
}

/// Exclusive owning handle that orphans its referent when released
pub struct OrphanablePtr<T: Orphanable> {
    ptr: Option<NonNull<T>>,
    _owns: PhantomData<T>,
}

// SAFETY: the handle owns the referent exclusively, like `Box<T>`.
unsafe impl<T: Orphanable + Send> Send for OrphanablePtr<T> {}
// SAFETY: shared access only hands out `&T`.
unsafe impl<T: Orphanable + Sync> Sync for OrphanablePtr<T> {}

impl<T: Orphanable> OrphanablePtr<T> {
    /// Allocate `value` through the factory and take ownership of it
    pub fn new(value: T) -> Self {
        Self {
            ptr: Some(factory::create(value)),
            _owns: PhantomData,
        }
    }

    /// A handle that owns nothing
    pub const fn empty() -> Self {
        Self {
            ptr: None,
            _owns: PhantomData,
        }
    }

    /// Take ownership of an existing object (or of nothing)
    ///
    /// # Safety
    ///
    /// A non-null `ptr` must come from `factory::create` and carry the owning
    /// reference, which moves into the handle. No other handle may own it.
    pub unsafe fn from_raw(ptr: Option<NonNull<T>>) -> Self {
        Self {
            ptr,
            _owns: PhantomData,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.ptr.is_none()
    }

    /// Borrow the referent, if any
    pub fn get(&self) -> Option<&T> {
        // SAFETY: a non-null handle keeps its referent alive.
        self.ptr.map(|ptr| unsafe { ptr.as_ref() })
    }

    /// Borrow the referent
    ///
    /// # Errors
    ///
    /// Returns `OrphanError::NullHandle` when the handle is empty.
    pub fn try_get(&self) -> Result<&T> {
        self.get().ok_or(OrphanError::NullHandle)
    }

    /// Raw pointer to the referent without giving up ownership
    pub fn as_ptr(&self) -> Option<NonNull<T>> {
        self.ptr
    }

    /// Move ownership into a new handle, leaving this one empty
    pub fn take(&mut self) -> Self {
        Self {
            ptr: self.ptr.take(),
            _owns: PhantomData,
        }
    }

    /// Give up ownership without orphaning
    ///
    /// The caller becomes responsible for orphaning the returned object.
    #[must_use = "dropping the pointer leaks the object"]
    pub fn into_raw(self) -> Option<NonNull<T>> {
        ManuallyDrop::new(self).ptr
    }

    /// Orphan the referent, if any, and leave the handle empty
    pub fn reset(&mut self) {
        if let Some(ptr) = self.ptr.take() {
            // SAFETY: the handle held the owning reference and has already forgotten it.
            unsafe { T::orphan(ptr) }
        }
    }

    /// Own a freshly allocated `value`, orphaning the previous referent
    pub fn replace(&mut self, value: T) {
        let previous = self.ptr.replace(factory::create(value));
        if let Some(ptr) = previous {
            // SAFETY: as in `reset`; the old pointer is no longer reachable from the handle.
            unsafe { T::orphan(ptr) }
        }
    }
}

impl<T: Orphanable> Deref for OrphanablePtr<T> {
    type Target = T;

    #[track_caller]
    fn deref(&self) -> &T {
        match self.get() {
            Some(value) => value,
            None => fail_fast(OrphanError::NullHandle),
        }
    }
}

impl<T: Orphanable> Drop for OrphanablePtr<T> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl<T: Orphanable> Default for OrphanablePtr<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: Orphanable> From<T> for OrphanablePtr<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Orphanable + fmt::Debug> fmt::Debug for OrphanablePtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => f.debug_tuple("OrphanablePtr").field(value).finish(),
            None => f.write_str("OrphanablePtr(<empty>)"),
        }
    }
}

/// Allocate `value` and wrap it in an owning handle
pub fn make_orphanable<T: Orphanable>(value: T) -> OrphanablePtr<T> {
    OrphanablePtr::new(value)
}
