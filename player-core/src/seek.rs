//! The seek handshake between the Controller and the Producer.
//!
//! The C source publishes a `bChangeSeek` flag and spins the calling thread
//! on `while (pending);` until the Producer clears it. Busy-waiting the
//! Controller's caller is acceptable in a demo but not in a library used
//! from arbitrary application threads, so here the Controller instead
//! blocks on a condvar that the Producer signals once it has applied the
//! seek — same handshake, no spin.

use std::sync::{Condvar, Mutex};

use crate::decoder::{DecoderError, SeekFrom};

struct Pending {
    offset: i64,
    whence: SeekFrom,
}

struct Inner {
    pending: Option<Pending>,
    result: Option<Result<u64, DecoderError>>,
}

pub struct SeekMailbox {
    inner: Mutex<Inner>,
    condvar: Condvar,
}

impl SeekMailbox {
    pub fn new() -> Self {
        SeekMailbox {
            inner: Mutex::new(Inner { pending: None, result: None }),
            condvar: Condvar::new(),
        }
    }

    /// Called from the Controller thread. Publishes a seek request and
    /// blocks until the Producer has applied it, returning the decoder's
    /// report of the new absolute frame position.
    pub fn request(&self, offset: i64, whence: SeekFrom) -> Result<u64, DecoderError> {
        let mut inner = self.inner.lock().unwrap();
        inner.result = None;
        inner.pending = Some(Pending { offset, whence });

        let mut inner = self
            .condvar
            .wait_while(inner, |inner| inner.result.is_none())
            .unwrap();

        inner.result.take().expect("condvar woke with no result set")
    }

    /// Called from the Producer thread: non-blocking. Returns the pending
    /// request, if any, leaving it outstanding until [`SeekMailbox::complete`]
    /// is called.
    pub fn poll(&self) -> Option<(i64, SeekFrom)> {
        let inner = self.inner.lock().unwrap();
        inner.pending.as_ref().map(|p| (p.offset, p.whence))
    }

    /// Called from the Producer thread once the seek has been applied to
    /// the decoder, waking the blocked Controller.
    pub fn complete(&self, result: Result<u64, DecoderError>) {
        let mut inner = self.inner.lock().unwrap();
        inner.pending = None;
        inner.result = Some(result);
        self.condvar.notify_all();
    }
}

impl Default for SeekMailbox {
    fn default() -> Self {
        SeekMailbox::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn request_blocks_until_producer_completes() {
        let mailbox = Arc::new(SeekMailbox::new());
        let producer_side = mailbox.clone();

        let producer = thread::spawn(move || loop {
            if let Some((offset, whence)) = producer_side.poll() {
                assert_eq!(offset, 10);
                assert_eq!(whence, SeekFrom::Begin);
                producer_side.complete(Ok(10));
                break;
            }
            thread::sleep(Duration::from_millis(1));
        });

        let position = mailbox.request(10, SeekFrom::Begin).unwrap();
        assert_eq!(position, 10);

        producer.join().unwrap();
    }

    #[test]
    fn producer_sees_nothing_without_a_request() {
        let mailbox = SeekMailbox::new();
        assert!(mailbox.poll().is_none());
    }
}
