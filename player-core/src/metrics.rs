//! Counters the Output callback updates and the Controller can sample.
//! Deliberately not a general telemetry framework — just the two numbers
//! the spec calls out: how far playback has progressed, and how often the
//! ring ran dry.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Default)]
pub struct Metrics {
    played_frames: AtomicU64,
    underruns: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics::default()
    }

    /// Called from the Producer after a successful decode read.
    pub fn add_played_frames(&self, frames: u64) {
        self.played_frames.fetch_add(frames, Ordering::Relaxed);
    }

    /// Called from the output callback when the ring had nothing to give.
    pub fn record_underrun(&self) {
        self.underruns.fetch_add(1, Ordering::Relaxed);
    }

    pub fn played_frames(&self) -> u64 {
        self.played_frames.load(Ordering::Relaxed)
    }

    pub fn underruns(&self) -> u64 {
        self.underruns.load(Ordering::Relaxed)
    }

    /// Reset the played-frame counter to a known position. Called by the
    /// Producer once a seek has actually been applied to the decoder, so
    /// `played_frames()` reflects the new cursor rather than a stale one.
    pub fn set_played_frames(&self, frames: u64) {
        self.played_frames.store(frames, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_start_at_zero_and_accumulate() {
        let m = Metrics::new();
        assert_eq!(m.played_frames(), 0);
        assert_eq!(m.underruns(), 0);

        m.add_played_frames(256);
        m.add_played_frames(256);
        m.record_underrun();

        assert_eq!(m.played_frames(), 512);
        assert_eq!(m.underruns(), 1);
    }

    #[test]
    fn set_played_frames_overrides_accumulated_value() {
        let m = Metrics::new();
        m.add_played_frames(1000);
        m.set_played_frames(42);
        assert_eq!(m.played_frames(), 42);
    }
}
