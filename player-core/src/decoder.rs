//! The contract the Producer needs from a sound source: a seekable,
//! frame-addressable stream of interleaved float samples. Implemented for
//! real files by `player-device`'s `symphonia` adapter; implemented in-memory
//! by tests and `player-cli --fake`.

use thiserror::Error;

/// Static properties of an opened sound source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AudioInfo {
    pub channels: u16,
    pub sample_rate: u32,
    /// `None` when the source cannot report an exact frame count (e.g. some
    /// streamed container/codec combinations).
    pub total_frames: Option<u64>,
}

/// Mirrors C's `SEEK_SET`/`SEEK_CUR`/`SEEK_END`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekFrom {
    Begin,
    Current,
    End,
}

#[derive(Debug, Error)]
pub enum DecoderError {
    #[error("failed to open sound source: {0}")]
    Open(String),
    #[error("seek failed: {0}")]
    Seek(String),
    #[error("read failed: {0}")]
    Read(String),
}

/// A seekable, frame-addressable source of interleaved float audio.
///
/// Called only from the Producer thread; implementations are not required to
/// be `Sync`, only [`Send`] so they can be handed off to the Producer thread
/// once at construction time.
pub trait Decoder: Send {
    fn info(&self) -> AudioInfo;

    /// Reads up to `frame_count` frames into `dst`, which must be at least
    /// `frame_count * channels` samples long. Returns the number of frames
    /// actually read; `0` signals end-of-stream.
    fn read_frames(&mut self, dst: &mut [f32], frame_count: usize) -> Result<usize, DecoderError>;

    /// Moves the read cursor and returns the absolute frame index after the
    /// seek.
    fn seek(&mut self, offset: i64, whence: SeekFrom) -> Result<u64, DecoderError>;
}

#[cfg(any(test, feature = "test-util"))]
pub mod fake {
    //! An in-memory [`Decoder`] used by `player-core`'s own tests and by
    //! `player-device`/`player-cli`'s `--fake` mode, so the engine can be
    //! exercised without real audio hardware or a real sound file.

    use super::{AudioInfo, Decoder, DecoderError, SeekFrom};

    /// A decoder over a fixed in-memory interleaved sample buffer.
    pub struct FakeDecoder {
        info: AudioInfo,
        samples: Vec<f32>,
        cursor_frames: u64,
    }

    impl FakeDecoder {
        pub fn new(channels: u16, sample_rate: u32, samples: Vec<f32>) -> Self {
            let total_frames = samples.len() as u64 / u64::from(channels);
            FakeDecoder {
                info: AudioInfo { channels, sample_rate, total_frames: Some(total_frames) },
                samples,
                cursor_frames: 0,
            }
        }

        /// A decoder that never runs out: useful for testing pause/stop
        /// without racing end-of-stream.
        pub fn silence(channels: u16, sample_rate: u32, total_frames: u64) -> Self {
            let samples = vec![0.0f32; (total_frames * u64::from(channels)) as usize];
            FakeDecoder::new(channels, sample_rate, samples)
        }
    }

    impl Decoder for FakeDecoder {
        fn info(&self) -> AudioInfo {
            self.info
        }

        fn read_frames(&mut self, dst: &mut [f32], frame_count: usize) -> Result<usize, DecoderError> {
            let channels = usize::from(self.info.channels);
            let total_frames = self.samples.len() / channels;
            let start = self.cursor_frames as usize;
            let available = total_frames.saturating_sub(start);
            let to_read = frame_count.min(available);

            let src = &self.samples[start * channels..(start + to_read) * channels];
            dst[..src.len()].copy_from_slice(src);

            self.cursor_frames += to_read as u64;
            Ok(to_read)
        }

        fn seek(&mut self, offset: i64, whence: SeekFrom) -> Result<u64, DecoderError> {
            let total_frames = (self.samples.len() / usize::from(self.info.channels)) as i64;

            let base = match whence {
                SeekFrom::Begin => 0,
                SeekFrom::Current => self.cursor_frames as i64,
                SeekFrom::End => total_frames,
            };

            let target = base
                .checked_add(offset)
                .ok_or_else(|| DecoderError::Seek("overflow computing seek target".into()))?;

            if target < 0 || target > total_frames {
                return Err(DecoderError::Seek(format!(
                    "seek target {target} out of range [0, {total_frames}]"
                )));
            }

            self.cursor_frames = target as u64;
            Ok(self.cursor_frames)
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn reads_then_reports_eof() {
            let mut dec = FakeDecoder::new(1, 8000, vec![1.0, 2.0, 3.0]);
            let mut buf = [0.0f32; 8];

            assert_eq!(dec.read_frames(&mut buf, 8).unwrap(), 3);
            assert_eq!(&buf[..3], &[1.0, 2.0, 3.0]);
            assert_eq!(dec.read_frames(&mut buf, 8).unwrap(), 0);
        }

        #[test]
        fn seek_variants() {
            let mut dec = FakeDecoder::new(1, 8000, vec![0.0; 10]);
            assert_eq!(dec.seek(5, SeekFrom::Begin).unwrap(), 5);
            assert_eq!(dec.seek(2, SeekFrom::Current).unwrap(), 7);
            assert_eq!(dec.seek(0, SeekFrom::End).unwrap(), 10);
            assert!(dec.seek(-20, SeekFrom::End).is_err());
        }
    }
}
