//! The public façade: `Player` owns the state machine and hands callers a
//! single `play`/`pause`/`stop`/`seek`/`destroy` surface, while the ring,
//! Producer thread and realtime callback do the actual work underneath.

use std::sync::Arc;
use std::time::Duration;

use crate::decoder::{AudioInfo, Decoder, SeekFrom};
use crate::error::PlayerError;
use crate::metrics::Metrics;
use crate::producer::{self, ProducerHandle, ThreadPriority};
use crate::ring::{self, RingConsumer};
use crate::seek::SeekMailbox;
use crate::state::{PlayerState, StateCell};
use crate::wake::Wake;

/// Starts, pauses and stops the actual host audio output stream.
///
/// `player-core` knows nothing about any particular audio API; a
/// `player-device`-style crate implements this trait over `cpal` (or
/// whatever host binding is in play) and hands the implementation to
/// [`Player::create`]. All three methods must be idempotent: calling
/// `start` while already started is not an error.
pub trait OutputControl: Send {
    fn start(&mut self) -> Result<(), String>;
    fn pause(&mut self) -> Result<(), String>;
    fn stop(&mut self) -> Result<(), String>;
}

/// A no-op [`OutputControl`] for headless use (tests, `--fake` demos)
/// where nothing actually needs to start making sound.
pub struct NullOutput;

impl OutputControl for NullOutput {
    fn start(&mut self) -> Result<(), String> {
        Ok(())
    }
    fn pause(&mut self) -> Result<(), String> {
        Ok(())
    }
    fn stop(&mut self) -> Result<(), String> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Frames per ring slot and per callback invocation.
    pub frames_per_block: usize,
    /// Ring slots; must be at least 2.
    pub max_blocks: usize,
    /// Ceiling on how long the Producer sleeps between checks when idle.
    pub wake_timeout: Duration,
    /// Ceiling on how long `destroy` waits for the Producer to join.
    pub destroy_timeout: Duration,
    pub producer_priority: ThreadPriority,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig {
            frames_per_block: 256,
            max_blocks: 4,
            wake_timeout: Duration::from_secs(1),
            destroy_timeout: Duration::from_secs(10),
            producer_priority: ThreadPriority::Elevated,
        }
    }
}

pub struct Player {
    state: Arc<StateCell>,
    seek: Arc<SeekMailbox>,
    wake: Arc<Wake>,
    metrics: Arc<Metrics>,
    producer: Option<ProducerHandle>,
    output: Box<dyn OutputControl>,
    info: AudioInfo,
    frames_per_block: u64,
    destroy_timeout: Duration,
}

impl Player {
    /// Builds the ring, spawns the Producer over `decoder`, and returns the
    /// Controller handle plus the consumer half of the ring for the caller's
    /// output binding to drain via [`crate::callback::fill`].
    pub fn create(
        decoder: Box<dyn Decoder>,
        output: Box<dyn OutputControl>,
        config: PlayerConfig,
    ) -> Result<(Player, RingConsumer), PlayerError> {
        if config.max_blocks < 2 {
            return Err(PlayerError::ResourceExhaustion);
        }

        let info = decoder.info();
        let channels = usize::from(info.channels);

        let (ring_producer, ring_consumer) =
            ring::ring(config.max_blocks, config.frames_per_block, channels);

        let state = Arc::new(StateCell::new(PlayerState::Stopped));
        let seek = Arc::new(SeekMailbox::new());
        let wake = Arc::new(Wake::new());
        let metrics = Arc::new(Metrics::new());

        let producer = producer::spawn(
            decoder,
            ring_producer,
            seek.clone(),
            wake.clone(),
            metrics.clone(),
            config.wake_timeout,
            config.producer_priority,
            channels,
        )
        .map_err(|_| PlayerError::ResourceExhaustion)?;

        let player = Player {
            state,
            seek,
            wake,
            metrics,
            producer: Some(producer),
            output,
            info,
            frames_per_block: config.frames_per_block as u64,
            destroy_timeout: config.destroy_timeout,
        };

        Ok((player, ring_consumer))
    }

    pub fn audio_info(&self) -> AudioInfo {
        self.info
    }

    pub fn frames_per_block(&self) -> u64 {
        self.frames_per_block
    }

    pub fn state(&self) -> PlayerState {
        self.state.load()
    }

    pub fn state_cell(&self) -> &Arc<StateCell> {
        &self.state
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// The Wake handle this player's realtime callback should ring after
    /// draining a Ring slot (see [`crate::callback::fill`]).
    pub fn wake(&self) -> &Arc<Wake> {
        &self.wake
    }

    /// Replaces the [`OutputControl`] backing this player.
    ///
    /// `create` wires up the ring and Producer before a real output binding
    /// can exist (it needs the ring's consumer half), so callers that need
    /// a real device stream construct with [`NullOutput`] and swap it in
    /// here once the device stream is open.
    pub fn set_output(&mut self, output: Box<dyn OutputControl>) {
        self.output = output;
    }

    /// Starts (or resumes) playback. Valid from any state; a no-op if
    /// already Playing.
    pub fn play(&mut self) -> Result<(), PlayerError> {
        if self.state.load() == PlayerState::Playing {
            return Ok(());
        }

        self.output.start().map_err(PlayerError::StreamControl)?;
        self.state.store(PlayerState::Playing);
        Ok(())
    }

    /// Suspends playback in place: the ring and decode position are left
    /// exactly where they are, so a subsequent `play` resumes seamlessly.
    pub fn pause(&mut self) -> Result<(), PlayerError> {
        if self.state.load() != PlayerState::Playing {
            return Ok(());
        }

        self.output.pause().map_err(PlayerError::StreamControl)?;
        self.state.store(PlayerState::Paused);
        Ok(())
    }

    /// Stops playback and rewinds to the start of the source.
    pub fn stop(&mut self) -> Result<(), PlayerError> {
        if self.state.load() == PlayerState::Stopped {
            return Ok(());
        }

        self.output.stop().map_err(PlayerError::StreamControl)?;
        self.wake.ring();
        // The Producer applies the seek and resets PlayedFrames to its
        // result itself (see `producer::spawn`); by the time `request`
        // returns the handshake has completed.
        self.seek.request(0, SeekFrom::Begin)?;
        self.state.store(PlayerState::Stopped);
        Ok(())
    }

    /// Moves the decode cursor. Valid in any state; does not itself change
    /// Playing/Paused/Stopped. Blocks the calling thread until the Producer
    /// has applied the seek and updated PlayedFrames to match.
    pub fn seek(&mut self, offset: i64, whence: SeekFrom) -> Result<u64, PlayerError> {
        self.wake.ring();
        self.seek.request(offset, whence)
    }

    pub fn played_frames(&self) -> u64 {
        self.metrics.played_frames()
    }

    pub fn underruns(&self) -> u64 {
        self.metrics.underruns()
    }

    /// Tears the player down: stops the output stream, signals the
    /// Producer to exit and joins it. Consumes `self` rather than leaving a
    /// half-torn-down instance around for further calls.
    pub fn destroy(mut self) -> Result<(), PlayerError> {
        let _ = self.output.stop();
        let producer = self.producer.take().expect("producer only taken here");

        producer
            .join(self.destroy_timeout)
            .map_err(|_| PlayerError::ShutdownTimeout)
    }
}
