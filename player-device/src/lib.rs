//! Host audio device binding (`cpal`) and file decoder (`symphonia`)
//! implementations of the traits `player-core` defines. Nothing in here is
//! realtime-safe to call except the callback installed by [`output::open`].

pub mod config;
pub mod decoder;
pub mod output;

pub use decoder::FileDecoder;
pub use output::{CpalOutput, OpenError};
