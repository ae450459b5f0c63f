//! Worker Shutdown Demonstration
//!
//! A `Connection` is orphaned by its owner while worker threads still hold
//! references to it. It is only freed when the last worker finishes.
#![allow(clippy::unwrap_used, clippy::expect_used)]
//!
//! Run with tracing visible:
//!
//! ```text
//! ORPHANAGE_TRACE=connection cargo run --example worker_demo
//! ```

use orphanage_core::{
    init_from_env, make_orphanable, DebugOnlyTraceFlag, InternallyRefCounted, Orphanable,
    RefCounter, TraceRegistry, TracedRefCount,
};
use orphanage_logging::{init, Profile};
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};

static CONNECTION_TRACER: DebugOnlyTraceFlag = DebugOnlyTraceFlag::new(false, "connection");

struct Connection {
    refs: TracedRefCount,
    peer: String,
    bytes_sent: AtomicU64,
}

impl Connection {
    fn new(peer: &str) -> Self {
        Self {
            refs: TracedRefCount::new(&CONNECTION_TRACER),
            peer: peer.to_string(),
            bytes_sent: AtomicU64::new(0),
        }
    }

    fn send(&self, bytes: u64) {
        self.bytes_sent.fetch_add(bytes, Ordering::Relaxed);
    }
}

impl Orphanable for Connection {
    unsafe fn orphan(this: NonNull<Self>) {
        println!("  owner orphaned {}", unsafe { this.as_ref() }.peer);
        unsafe { Self::release_ref(this, Some("owner")) }
    }
}

unsafe impl InternallyRefCounted for Connection {
    type Counter = TracedRefCount;

    fn ref_counter(&self) -> &TracedRefCount {
        &self.refs
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        println!(
            "  freed {} after {} bytes",
            self.peer,
            self.bytes_sent.load(Ordering::Relaxed)
        );
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init(Profile::Development);
    TraceRegistry::global().register(&CONNECTION_TRACER);
    if let Some(report) = init_from_env() {
        println!("trace config: {:?}", report);
    }

    println!("=== Orphanage Worker Demo ===\n");

    let connection = make_orphanable(Connection::new("10.0.0.7:443"));
    println!("created, count = {}", connection.ref_counter().count());

    std::thread::scope(|scope| {
        for worker in 0..3_u64 {
            let lease = connection.take_ref_with_reason("worker");
            scope.spawn(move || {
                for chunk in 0..4 {
                    lease.send((worker + 1) * 100 + chunk);
                }
                println!("  worker {} done", worker);
            });
        }

        let mut connection = connection;
        connection.reset();
    });

    println!("\nall workers finished");
    Ok(())
}
