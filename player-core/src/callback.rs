//! The realtime pull function. Everything here runs on the host audio API's
//! own thread under a hard deadline: no allocation, no locking, no I/O, no
//! syscalls beyond what reading a couple of atomics costs.

use crate::metrics::Metrics;
use crate::ring::RingConsumer;
use crate::state::{PlayerState, StateCell};
use crate::wake::Wake;

/// Fills `out` (interleaved samples, `out.len()` a multiple of the block's
/// channel count) by draining exactly one block per call from `ring`.
///
/// `out.len()` must equal `ring.block_len()`; the host audio binding is
/// responsible for configuring the stream's buffer size to match.
///
/// Does not touch [`Metrics::played_frames`] — that counter tracks decode
/// progress and is owned by the Producer, not the callback; this function
/// only records underruns, the one metric that is properly the callback's
/// own to report.
///
/// Rings `wake` (lock-free — see [`Wake::ring_from_realtime`]) after
/// draining a slot, so the Producer refills promptly instead of waiting
/// out the full wake timeout (spec §3's "Ring-slot-freed event").
pub fn fill(
    out: &mut [f32],
    ring: &mut RingConsumer,
    state: &StateCell,
    metrics: &Metrics,
    wake: &Wake,
) {
    debug_assert_eq!(out.len(), ring.block_len());

    if state.load() != PlayerState::Playing {
        out.fill(0.0);
        return;
    }

    match ring.try_claim_read_slot() {
        Some(block) => {
            out.copy_from_slice(block);
            ring.commit_read();
            wake.ring_from_realtime();
        }
        None => {
            out.fill(0.0);
            metrics.record_underrun();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ring::ring;

    #[test]
    fn paused_emits_silence_without_touching_the_ring() {
        let (mut prod, mut cons) = ring(4, 2, 1);
        let slot = prod.try_claim_write_slot().unwrap();
        slot.copy_from_slice(&[1.0, 1.0]);
        prod.commit_write();

        let state = StateCell::new(PlayerState::Paused);
        let metrics = Metrics::new();
        let wake = Wake::new();
        let mut out = [9.0f32; 2];

        fill(&mut out, &mut cons, &state, &metrics, &wake);

        assert_eq!(out, [0.0, 0.0]);
        // Slot is still there, untouched, for when playback resumes.
        assert!(cons.try_claim_read_slot().is_some());
    }

    #[test]
    fn playing_drains_a_block() {
        let (mut prod, mut cons) = ring(4, 2, 1);
        let slot = prod.try_claim_write_slot().unwrap();
        slot.copy_from_slice(&[1.0, 2.0]);
        prod.commit_write();

        let state = StateCell::new(PlayerState::Playing);
        let metrics = Metrics::new();
        let wake = Wake::new();
        let mut out = [0.0f32; 2];

        fill(&mut out, &mut cons, &state, &metrics, &wake);

        assert_eq!(out, [1.0, 2.0]);
    }

    #[test]
    fn draining_a_block_rings_the_wake() {
        let (mut prod, mut cons) = ring(4, 2, 1);
        let slot = prod.try_claim_write_slot().unwrap();
        slot.copy_from_slice(&[1.0, 2.0]);
        prod.commit_write();

        let state = StateCell::new(PlayerState::Playing);
        let metrics = Metrics::new();
        let wake = Wake::new();
        let mut out = [0.0f32; 2];

        fill(&mut out, &mut cons, &state, &metrics, &wake);

        // Rung, so a concurrent `wait_timeout` returns immediately rather
        // than sleeping out the full timeout.
        wake.wait_timeout(std::time::Duration::from_secs(5));
    }

    #[test]
    fn underrun_emits_silence_and_counts_it() {
        let (_prod, mut cons) = ring(4, 2, 1);
        let state = StateCell::new(PlayerState::Playing);
        let metrics = Metrics::new();
        let wake = Wake::new();
        let mut out = [9.0f32; 2];

        fill(&mut out, &mut cons, &state, &metrics, &wake);

        assert_eq!(out, [0.0, 0.0]);
        assert_eq!(metrics.underruns(), 1);
    }
}
