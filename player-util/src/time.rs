//! Small conversions between frame counts and wall-clock durations. Kept
//! separate from `player-core` since the core only ever reasons in frames;
//! these are for callers (CLI, tests) that want to print or compare against
//! a `Duration`.

use std::time::Duration;

pub fn frames_to_duration(frames: u64, sample_rate: u32) -> Duration {
    if sample_rate == 0 {
        return Duration::ZERO;
    }
    let micros = (u128::from(frames) * 1_000_000) / u128::from(sample_rate);
    Duration::from_micros(u64::try_from(micros).unwrap_or(u64::MAX))
}

pub fn duration_to_frames(duration: Duration, sample_rate: u32) -> u64 {
    let micros = duration.as_micros();
    let frames = (micros * u128::from(sample_rate)) / 1_000_000;
    u64::try_from(frames).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_is_approximate() {
        let d = frames_to_duration(44_100, 44_100);
        assert_eq!(d, Duration::from_secs(1));

        let f = duration_to_frames(Duration::from_secs(2), 44_100);
        assert_eq!(f, 88_200);
    }

    #[test]
    fn zero_sample_rate_is_safe() {
        assert_eq!(frames_to_duration(100, 0), Duration::ZERO);
    }
}
