//! A bounded-wait doorbell the Producer sleeps on between bursts of work.
//!
//! Mirrors the C source's `sem_timedwait` with a 1s ceiling: the Producer
//! wakes either because someone rang the bell (ring slot freed, seek
//! requested, shutdown requested) or because the timeout elapsed, so a
//! missed or coalesced notification can never wedge it forever.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Condvar, Mutex};
use std::time::Duration;

pub struct Wake {
    rung: AtomicBool,
    gate: Mutex<()>,
    condvar: Condvar,
}

impl Wake {
    pub fn new() -> Self {
        Wake { rung: AtomicBool::new(false), gate: Mutex::new(()), condvar: Condvar::new() }
    }

    /// Rings the bell from a non-realtime thread (the Controller, or
    /// `ProducerHandle::join`'s shutdown signal). Safe to call any number
    /// of times before the Producer gets around to waiting.
    pub fn ring(&self) {
        let _guard = self.gate.lock().unwrap();
        self.rung.store(true, Ordering::Release);
        self.condvar.notify_one();
    }

    /// Rings the bell from the realtime output callback after draining a
    /// Ring slot (spec §3's "Ring-slot-freed event").
    ///
    /// Lock-free: unlike [`Wake::ring`], this never takes `gate`, so it
    /// can't block the realtime thread on a contended mutex. This mirrors
    /// `JAudioPlayer.c`'s `paCallback`, which calls `sem_post` — also a
    /// non-blocking, realtime-safe notify — right after decrementing
    /// `availableBlocks`. The tiny chance of a notification racing a
    /// concurrent `wait_timeout` and being missed is bounded by the wake
    /// timeout, same as any other lost wake.
    pub fn ring_from_realtime(&self) {
        self.rung.store(true, Ordering::Release);
        self.condvar.notify_one();
    }

    /// Waits until rung or `timeout` elapses, whichever comes first. Clears
    /// the bell on return so the next call blocks again.
    pub fn wait_timeout(&self, timeout: Duration) {
        let guard = self.gate.lock().unwrap();
        let (_guard, _) = self
            .condvar
            .wait_timeout_while(guard, timeout, |_| !self.rung.load(Ordering::Acquire))
            .unwrap();
        self.rung.store(false, Ordering::Release);
    }
}

impl Default for Wake {
    fn default() -> Self {
        Wake::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Instant;

    #[test]
    fn wait_returns_promptly_when_rung() {
        let wake = Arc::new(Wake::new());
        let waker = wake.clone();

        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            waker.ring();
        });

        let start = Instant::now();
        wake.wait_timeout(Duration::from_secs(5));
        assert!(start.elapsed() < Duration::from_secs(1));

        handle.join().unwrap();
    }

    #[test]
    fn wait_times_out_without_a_ring() {
        let wake = Wake::new();
        let start = Instant::now();
        wake.wait_timeout(Duration::from_millis(30));
        assert!(start.elapsed() >= Duration::from_millis(30));
    }
}
