#![allow(dead_code)]

use orphanage_core::{
    factory, InternalRefCount, InternallyRefCounted, Orphanable, TraceGate, TracedRefCount,
};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared counters observing one test object's lifecycle
#[derive(Clone, Default)]
pub struct Lifecycle {
    orphans: Arc<AtomicUsize>,
    drops: Arc<AtomicUsize>,
}

impl Lifecycle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orphans(&self) -> usize {
        self.orphans.load(Ordering::SeqCst)
    }

    pub fn drops(&self) -> usize {
        self.drops.load(Ordering::SeqCst)
    }

    fn record_orphan(&self) {
        self.orphans.fetch_add(1, Ordering::SeqCst);
    }

    fn record_drop(&self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Plain orphanable: orphan frees it directly
pub struct Foo {
    value: i32,
    lifecycle: Lifecycle,
}

impl Foo {
    pub fn new(value: i32, lifecycle: &Lifecycle) -> Self {
        Self {
            value,
            lifecycle: lifecycle.clone(),
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }
}

impl Orphanable for Foo {
    unsafe fn orphan(this: NonNull<Self>) {
        unsafe { this.as_ref() }.lifecycle.record_orphan();
        unsafe { factory::destroy(this) }
    }
}

impl Drop for Foo {
    fn drop(&mut self) {
        self.lifecycle.record_drop();
    }
}

/// Ref-counted orphanable: orphan releases the creation reference
pub struct Bar {
    refs: InternalRefCount,
    value: i32,
    lifecycle: Lifecycle,
}

impl Bar {
    pub fn new(value: i32, lifecycle: &Lifecycle) -> Self {
        Self {
            refs: InternalRefCount::new(),
            value,
            lifecycle: lifecycle.clone(),
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn start_work(&self) {
        self.add_ref();
    }

    /// # Safety
    ///
    /// Pairs with an earlier `start_work` on the object `this` points to.
    pub unsafe fn finish_work(this: NonNull<Self>) {
        unsafe { Self::release_ref(this, None) }
    }
}

impl Orphanable for Bar {
    unsafe fn orphan(this: NonNull<Self>) {
        unsafe { this.as_ref() }.lifecycle.record_orphan();
        unsafe { Self::release_ref(this, None) }
    }
}

unsafe impl InternallyRefCounted for Bar {
    type Counter = InternalRefCount;

    fn ref_counter(&self) -> &InternalRefCount {
        &self.refs
    }
}

impl Drop for Bar {
    fn drop(&mut self) {
        self.lifecycle.record_drop();
    }
}

/// Ref-counted orphanable whose transitions are traced through `G`
pub struct Baz<G: TraceGate + 'static> {
    refs: TracedRefCount<G>,
    value: i32,
    lifecycle: Lifecycle,
}

impl<G: TraceGate + 'static> Baz<G> {
    pub fn new(gate: &'static G, value: i32, lifecycle: &Lifecycle) -> Self {
        Self {
            refs: TracedRefCount::new(gate),
            value,
            lifecycle: lifecycle.clone(),
        }
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    pub fn start_work(&self) {
        self.add_ref_with_reason("work");
    }

    /// # Safety
    ///
    /// Pairs with an earlier `start_work` on the object `this` points to.
    pub unsafe fn finish_work(this: NonNull<Self>) {
        unsafe { Self::release_ref(this, Some("work")) }
    }
}

impl<G: TraceGate + 'static> Orphanable for Baz<G> {
    unsafe fn orphan(this: NonNull<Self>) {
        unsafe { this.as_ref() }.lifecycle.record_orphan();
        unsafe { Self::release_ref(this, None) }
    }
}

unsafe impl<G: TraceGate + 'static> InternallyRefCounted for Baz<G> {
    type Counter = TracedRefCount<G>;

    fn ref_counter(&self) -> &TracedRefCount<G> {
        &self.refs
    }
}

impl<G: TraceGate + 'static> Drop for Baz<G> {
    fn drop(&mut self) {
        self.lifecycle.record_drop();
    }
}
