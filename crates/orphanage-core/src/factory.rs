//! Heap factory for lifecycle-managed objects
//!
//! `create` moves a value to the heap and hands back exclusive ownership as a
//! raw pointer; `destroy` is its inverse. Orphan implementations and the last
//! ref-count release call `destroy`; nothing else should.

use std::ptr::NonNull;

/// Allocate `value` on the heap and return an owning pointer to it
pub fn create<T>(value: T) -> NonNull<T> {
    NonNull::from(Box::leak(Box::new(value)))
}

/// Drop and free an object allocated by `create`
///
/// # Safety
///
/// `ptr` must come from `create::<T>`, must not have been destroyed already,
/// and no reference to the object may be used after this call.
pub unsafe fn destroy<T>(ptr: NonNull<T>) {
    // SAFETY: per the contract, `ptr` is a live allocation from `Box::leak`.
    drop(unsafe { Box::from_raw(ptr.as_ptr()) });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Tracked(Arc<AtomicUsize>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_create_then_destroy_drops_once() {
        let drops = Arc::new(AtomicUsize::new(0));
        let ptr = create(Tracked(drops.clone()));
        assert_eq!(drops.load(Ordering::SeqCst), 0);

        unsafe { destroy(ptr) };
        assert_eq!(drops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_create_preserves_value() {
        let ptr = create(41_u32 + 1);
        assert_eq!(unsafe { *ptr.as_ref() }, 42);
        unsafe { destroy(ptr) };
    }
}
