//! The three-state machine shared between the Controller (writer) and the
//! Output callback (reader). The Producer never reads this directly — it
//! only reacts to seek requests and shutdown, and otherwise fills the ring
//! unconditionally regardless of Paused/Playing.

use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Stopped,
    Paused,
    Playing,
}

impl PlayerState {
    fn to_u8(self) -> u8 {
        match self {
            PlayerState::Stopped => 0,
            PlayerState::Paused => 1,
            PlayerState::Playing => 2,
        }
    }

    fn from_u8(v: u8) -> PlayerState {
        match v {
            0 => PlayerState::Stopped,
            1 => PlayerState::Paused,
            _ => PlayerState::Playing,
        }
    }
}

/// An atomic cell holding a [`PlayerState`].
///
/// Written by the Controller under its own mutex (so transitions are
/// serialized among themselves); read without locking by the output
/// callback, which must never block.
pub struct StateCell {
    state: AtomicU8,
}

impl StateCell {
    pub fn new(initial: PlayerState) -> Self {
        StateCell { state: AtomicU8::new(initial.to_u8()) }
    }

    /// Read from the realtime callback: must stay lock-free.
    pub fn load(&self) -> PlayerState {
        PlayerState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn store(&self, state: PlayerState) {
        self.state.store(state.to_u8(), Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_all_variants() {
        let cell = StateCell::new(PlayerState::Stopped);
        assert_eq!(cell.load(), PlayerState::Stopped);

        cell.store(PlayerState::Playing);
        assert_eq!(cell.load(), PlayerState::Playing);

        cell.store(PlayerState::Paused);
        assert_eq!(cell.load(), PlayerState::Paused);
    }
}
