//! The Producer task: the only thread that ever touches the [`Decoder`].
//! Runs until told to shut down, alternately servicing seek requests and
//! refilling the ring, sleeping on a [`Wake`] in between so it doesn't spin
//! once the ring is full and there's no seek outstanding.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::decoder::Decoder;
use crate::metrics::Metrics;
use crate::ring::RingProducer;
use crate::seek::SeekMailbox;
use crate::wake::Wake;

/// How eagerly the OS scheduler should run the Producer. Not realtime in the
/// audio-callback sense — it can block on decode I/O — but missing its
/// deadline by too much starves the ring, so a nudge above normal priority
/// helps on systems that grant it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadPriority {
    Normal,
    Elevated,
}

pub struct ProducerHandle {
    wake: Arc<Wake>,
    shutdown: Arc<AtomicBool>,
    join: Option<JoinHandle<()>>,
}

impl ProducerHandle {
    /// Requests shutdown and blocks until the Producer thread exits or
    /// `timeout` elapses. Idempotent-safe to call once; the handle is
    /// consumed either way.
    pub fn join(mut self, timeout: Duration) -> Result<(), Duration> {
        self.shutdown.store(true, Ordering::Release);
        self.wake.ring();

        let handle = self.join.take().expect("join called once");
        // std's JoinHandle has no timed join; approximate it by polling
        // is_finished, which is the documented workaround.
        let deadline = std::time::Instant::now() + timeout;
        while !handle.is_finished() {
            if std::time::Instant::now() >= deadline {
                return Err(timeout);
            }
            std::thread::sleep(Duration::from_millis(1));
        }
        handle.join().expect("producer thread panicked");
        Ok(())
    }

    pub fn wake(&self) -> &Arc<Wake> {
        &self.wake
    }
}

/// Spawns the Producer thread. `channels` must match the ring's block
/// layout (`frames_per_block * channels` samples per slot).
///
/// Fails only if the OS refuses to spawn the thread at all (out of
/// threads/memory); the caller surfaces that as [`crate::error::
/// PlayerError::ResourceExhaustion`] rather than panicking.
pub fn spawn(
    mut decoder: Box<dyn Decoder>,
    mut ring: RingProducer,
    seek: Arc<SeekMailbox>,
    wake: Arc<Wake>,
    metrics: Arc<Metrics>,
    wake_timeout: Duration,
    priority: ThreadPriority,
    channels: usize,
) -> std::io::Result<ProducerHandle> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let shutdown_in_thread = shutdown.clone();
    let wake_in_thread = wake.clone();

    let join = player_util::thread::start("player-producer", move || {
        if priority == ThreadPriority::Elevated {
            player_util::thread::set_realtime_priority();
        }

        let frames_per_block = ring.block_len() / channels;
        let mut eof = false;

        loop {
            if shutdown_in_thread.load(Ordering::Acquire) {
                break;
            }

            if let Some((offset, whence)) = seek.poll() {
                let result = decoder.seek(offset, whence);
                if let Ok(position) = result {
                    eof = false;
                    metrics.set_played_frames(position);
                }
                seek.complete(result);
                continue;
            }

            // Keeps the ring topped up with silence forever past end of
            // stream (mirrors `JAudioPlayer.c`'s `audioBufferProducer`,
            // which recomputes `blocksNeeded` every wake and keeps calling
            // `sf_read` — zero post-EOF — rather than stopping after one
            // terminal block), so a stalled Producer still shows up as a
            // real Underrun instead of the ring silently running dry.
            let mut filled_any = false;
            while let Some(slot) = ring.try_claim_write_slot() {
                if eof {
                    slot.fill(0.0);
                } else {
                    match decoder.read_frames(slot, frames_per_block) {
                        Ok(0) => {
                            slot.fill(0.0);
                            eof = true;
                        }
                        Ok(n) if n < frames_per_block => {
                            let channels_len = slot.len() / frames_per_block;
                            slot[n * channels_len..].fill(0.0);
                            metrics.add_played_frames(n as u64);
                            eof = true;
                        }
                        Ok(n) => {
                            metrics.add_played_frames(n as u64);
                        }
                        Err(err) => {
                            log::warn!(
                                "decode error, substituting silence for this block: {err}"
                            );
                            slot.fill(0.0);
                            eof = true;
                        }
                    }
                }

                ring.commit_write();
                filled_any = true;
            }

            if !filled_any {
                wake_in_thread.wait_timeout(wake_timeout);
            }
        }
    })?;

    Ok(ProducerHandle { wake, shutdown, join: Some(join) })
}
