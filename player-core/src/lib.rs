//! The engine: a lock-free ring bridging a disk-resident [`Decoder`] to a
//! realtime output callback, a Producer thread that keeps the ring fed, and
//! a [`Player`] façade exposing play/pause/stop/seek/destroy.
//!
//! Host audio device binding (opening a stream, picking a sample format)
//! and decoder implementations for real file formats live in `player-device`;
//! this crate only defines the [`Decoder`] and [`OutputControl`] traits they
//! implement.

pub mod callback;
pub mod controller;
pub mod decoder;
pub mod error;
pub mod metrics;
pub mod producer;
pub mod ring;
pub mod seek;
pub mod state;
pub mod wake;

pub use controller::{NullOutput, OutputControl, Player, PlayerConfig};
pub use decoder::{AudioInfo, Decoder, DecoderError, SeekFrom};
pub use error::PlayerError;
pub use producer::ThreadPriority;
pub use state::PlayerState;
