#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{Bar, Lifecycle};
use orphanage_core::{
    factory, make_orphanable, InternallyRefCounted, Orphanable, OrphanablePtr, RefCounter, RefGuard,
};
use proptest::prelude::*;
use std::sync::Barrier;

#[test]
fn test_orphan_without_other_references_destroys() {
    let lifecycle = Lifecycle::new();
    let bar = make_orphanable(Bar::new(0, &lifecycle));
    assert_eq!(bar.ref_counter().count(), 1);

    drop(bar);

    assert_eq!(lifecycle.orphans(), 1);
    assert_eq!(lifecycle.drops(), 1);
}

#[test]
fn test_start_and_finish_work_then_orphan() {
    let lifecycle = Lifecycle::new();
    let bar = make_orphanable(Bar::new(0, &lifecycle));
    let ptr = bar.as_ptr().unwrap();

    bar.start_work();
    assert_eq!(bar.ref_counter().count(), 2);

    unsafe { Bar::finish_work(ptr) };
    assert_eq!(bar.ref_counter().count(), 1);
    assert_eq!(lifecycle.drops(), 0);

    drop(bar);
    assert_eq!(lifecycle.drops(), 1);
}

#[test]
fn test_orphan_before_work_finishes_defers_destruction() {
    let lifecycle = Lifecycle::new();
    let bar = make_orphanable(Bar::new(4, &lifecycle));

    let work = bar.take_ref();
    drop(bar);

    assert_eq!(lifecycle.orphans(), 1);
    assert_eq!(lifecycle.drops(), 0);
    assert_eq!(work.value(), 4);
    assert_eq!(work.ref_counter().count(), 1);

    drop(work);
    assert_eq!(lifecycle.drops(), 1);
}

#[test]
fn test_n_increments_need_n_plus_one_decrements() {
    const N: usize = 5;
    let lifecycle = Lifecycle::new();
    let ptr = factory::create(Bar::new(0, &lifecycle));
    let bar = unsafe { ptr.as_ref() };

    for _ in 0..N {
        bar.add_ref();
    }
    assert_eq!(bar.ref_counter().count(), N + 1);

    for _ in 0..N {
        unsafe { Bar::release_ref(ptr, None) };
        assert_eq!(lifecycle.drops(), 0);
    }

    // The final decrement is the orphan of the creation reference.
    unsafe { Bar::orphan(ptr) };
    assert_eq!(lifecycle.drops(), 1);
}

#[test]
fn test_guard_release_and_clone() {
    let lifecycle = Lifecycle::new();
    let bar = make_orphanable(Bar::new(0, &lifecycle));

    let first = bar.take_ref();
    let second = first.clone();
    assert_eq!(bar.ref_counter().count(), 3);

    first.release();
    assert_eq!(bar.ref_counter().count(), 2);

    drop(bar);
    assert_eq!(second.ref_counter().count(), 1);
    assert_eq!(lifecycle.drops(), 0);

    second.release();
    assert_eq!(lifecycle.drops(), 1);
}

#[test]
fn test_guard_records_reason_and_location() {
    let lifecycle = Lifecycle::new();
    let bar = make_orphanable(Bar::new(0, &lifecycle));

    let line = line!() + 1;
    let guard = bar.take_ref_with_reason("flush");

    assert_eq!(guard.reason(), Some("flush"));
    assert_eq!(guard.location().line(), line);
    assert!(guard.location().file().ends_with("ref_count_tests.rs"));
}

#[test]
#[should_panic(expected = "ERR_NULL_HANDLE")]
fn test_take_ref_from_empty_handle_fails_fast() {
    let bar: OrphanablePtr<Bar> = OrphanablePtr::empty();
    let _guard = bar.take_ref();
}

#[test]
fn test_guard_is_send_and_sync() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RefGuard<Bar>>();
    assert_send_sync::<OrphanablePtr<Bar>>();
}

#[test]
fn test_concurrent_holders_destroy_exactly_once() {
    const THREADS: usize = 8;
    const ROUNDS: usize = 1_000;

    let lifecycle = Lifecycle::new();
    let bar = make_orphanable(Bar::new(0, &lifecycle));
    let barrier = Barrier::new(THREADS + 1);

    std::thread::scope(|scope| {
        for _ in 0..THREADS {
            let held = bar.take_ref();
            let barrier = &barrier;
            scope.spawn(move || {
                barrier.wait();
                for _ in 0..ROUNDS {
                    let extra = held.clone();
                    drop(extra);
                }
                drop(held);
            });
        }

        // Orphan while workers are still running.
        let mut bar = bar;
        barrier.wait();
        bar.reset();
    });

    assert_eq!(lifecycle.orphans(), 1);
    assert_eq!(lifecycle.drops(), 1);
}

#[test]
fn test_last_concurrent_release_destroys() {
    const THREADS: usize = 16;

    let lifecycle = Lifecycle::new();
    let bar = make_orphanable(Bar::new(0, &lifecycle));
    let guards: Vec<_> = (0..THREADS).map(|_| bar.take_ref()).collect();
    drop(bar);
    let barrier = Barrier::new(THREADS);

    std::thread::scope(|scope| {
        for guard in guards {
            let barrier = &barrier;
            scope.spawn(move || {
                barrier.wait();
                drop(guard);
            });
        }
    });

    assert_eq!(lifecycle.drops(), 1);
}

#[derive(Debug, Clone)]
enum Step {
    Take,
    Release,
    Orphan,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => Just(Step::Take),
        3 => Just(Step::Release),
        1 => Just(Step::Orphan),
    ]
}

proptest! {
    #[test]
    fn prop_destroyed_once_on_last_release(steps in prop::collection::vec(step(), 0..64)) {
        let lifecycle = Lifecycle::new();
        let mut bar = make_orphanable(Bar::new(0, &lifecycle));
        let mut guards = Vec::new();

        for step in steps {
            match step {
                Step::Take => {
                    if !bar.is_empty() {
                        guards.push(bar.take_ref());
                    } else if let Some(guard) = guards.last() {
                        let extra = guard.clone();
                        guards.push(extra);
                    }
                }
                Step::Release => {
                    guards.pop();
                }
                Step::Orphan => bar.reset(),
            }

            let alive = !bar.is_empty() || !guards.is_empty();
            prop_assert_eq!(lifecycle.drops(), usize::from(!alive));
            if let Some(guard) = guards.last() {
                let expected = guards.len() + usize::from(!bar.is_empty());
                prop_assert_eq!(guard.ref_counter().count(), expected);
            }
        }

        bar.reset();
        guards.clear();
        prop_assert_eq!(lifecycle.orphans(), 1);
        prop_assert_eq!(lifecycle.drops(), 1);
    }
}
