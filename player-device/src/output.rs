//! Builds the `cpal` output stream that drives [`player_core::callback::fill`].
//!
//! `cpal::Stream` isn't `Send` on every platform, so — mirroring the
//! teacher's device binding — the stream is built and held on a dedicated
//! thread and controlled from the calling thread only via play/pause
//! commands and a drop guard.

use std::sync::mpsc;
use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{OutputCallbackInfo, Stream};
use thiserror::Error;

use player_core::callback;
use player_core::controller::OutputControl;
use player_core::metrics::Metrics;
use player_core::ring::RingConsumer;
use player_core::state::StateCell;
use player_core::wake::Wake;

use crate::config;

#[derive(Debug, Error)]
pub enum OpenError {
    #[error("no output audio device available")]
    NoDeviceAvailable,
    #[error("failed to select a stream configuration: {0}")]
    Configure(#[from] config::ConfigError),
    #[error("failed to build the output stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("output stream thread failed to start")]
    ThreadError,
}

enum Command {
    Play,
    Pause,
}

/// An [`OutputControl`] implementation backed by a live `cpal` output
/// stream. Dropping it tears the stream down.
pub struct CpalOutput {
    commands: mpsc::Sender<Command>,
    // Holding the guard keeps the stream-owning thread alive; dropping it
    // tells that thread to stop the stream and exit.
    _guard: mpsc::SyncSender<()>,
}

/// Opens the default output device and wires its callback to drain `ring`.
pub fn open(
    ring: RingConsumer,
    state: Arc<StateCell>,
    metrics: Arc<Metrics>,
    wake: Arc<Wake>,
    channels: u16,
    sample_rate: u32,
    frames_per_block: usize,
) -> Result<CpalOutput, OpenError> {
    let (result_tx, result_rx) = mpsc::sync_channel(0);
    let (guard_tx, guard_rx) = mpsc::sync_channel(0);
    let (command_tx, command_rx) = mpsc::channel();

    let spawned = player_util::thread::start("player-device", move || {
        let outcome =
            build_stream(ring, state, metrics, wake, channels, sample_rate, frames_per_block);

        let stream = match outcome {
            Ok(stream) => {
                let _ = result_tx.send(Ok(()));
                stream
            }
            Err(err) => {
                let _ = result_tx.send(Err(err));
                return;
            }
        };

        loop {
            match command_rx.recv() {
                Ok(Command::Play) => {
                    if let Err(err) = stream.play() {
                        log::error!("failed to resume output stream: {err}");
                    }
                }
                Ok(Command::Pause) => {
                    if let Err(err) = stream.pause() {
                        log::error!("failed to pause output stream: {err}");
                    }
                }
                Err(_) => break,
            }
        }

        // Block until the guard sender is dropped (CpalOutput dropped),
        // then let `stream` fall out of scope and tear down.
        let _ = guard_rx.recv();
    });

    if spawned.is_err() {
        return Err(OpenError::ThreadError);
    }

    match result_rx.recv() {
        Ok(Ok(())) => Ok(CpalOutput { commands: command_tx, _guard: guard_tx }),
        Ok(Err(err)) => Err(err),
        Err(_) => Err(OpenError::ThreadError),
    }
}

/// Builds the `cpal` stream but does not start it: spec §4.5's `create()`
/// contract is explicit that "the stream is not started" and the player's
/// initial state is Stopped. The stream only starts once `OutputControl::
/// start` sends the first [`Command::Play`].
fn build_stream(
    mut ring: RingConsumer,
    state: Arc<StateCell>,
    metrics: Arc<Metrics>,
    wake: Arc<Wake>,
    channels: u16,
    sample_rate: u32,
    frames_per_block: usize,
) -> Result<Stream, OpenError> {
    let host = cpal::default_host();
    let device = host.default_output_device().ok_or(OpenError::NoDeviceAvailable)?;
    let stream_config = config::for_device(&device, channels, sample_rate, frames_per_block)?;

    let mut named_thread = false;

    let stream = device.build_output_stream(
        &stream_config,
        move |data: &mut [f32], _info: &OutputCallbackInfo| {
            if !named_thread {
                player_util::thread::set_name("player-callback");
                player_util::thread::set_realtime_priority();
                named_thread = true;
            }

            callback::fill(data, &mut ring, &state, &metrics, &wake);
        },
        move |err| {
            log::error!("output stream error: {err}");
        },
        None,
    )?;

    Ok(stream)
}

impl OutputControl for CpalOutput {
    fn start(&mut self) -> Result<(), String> {
        self.commands.send(Command::Play).map_err(|_| "output stream thread is gone".to_string())
    }

    fn pause(&mut self) -> Result<(), String> {
        self.commands.send(Command::Pause).map_err(|_| "output stream thread is gone".to_string())
    }

    fn stop(&mut self) -> Result<(), String> {
        // The cpal stream itself only has play/pause; "stopped" playback
        // position is tracked by `Player`'s state machine and the seek
        // back to frame 0, so pausing the device stream is sufficient here.
        self.pause()
    }
}
