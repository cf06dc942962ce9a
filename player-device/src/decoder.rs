//! A [`player_core::Decoder`] backed by `symphonia`, covering whatever
//! container/codec combination symphonia's default registry supports
//! (WAV, FLAC, MP3, Ogg/Vorbis, AAC, ...).

use std::fs::File;
use std::path::Path;

use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{Decoder as SymphoniaDecoderTrait, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::Time;

use player_core::decoder::{AudioInfo, Decoder, DecoderError, SeekFrom};

/// Opens and decodes a sound file frame-by-frame on demand.
///
/// Owned exclusively by the Producer task: every method here may block on
/// file I/O, which is fine off the realtime thread and the whole reason
/// the ring exists.
pub struct FileDecoder {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn SymphoniaDecoderTrait>,
    track_id: u32,
    info: AudioInfo,
    /// Leftover interleaved samples from a packet that didn't fit entirely
    /// into the caller's destination buffer in one `read_frames` call.
    pending: Vec<f32>,
    cursor_frames: u64,
}

impl FileDecoder {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DecoderError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| DecoderError::Open(e.to_string()))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &Default::default(), &MetadataOptions::default())
            .map_err(|e| DecoderError::Open(format!("probe failed: {e}")))?;

        let format = probed.format;

        let track = format
            .tracks()
            .iter()
            .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
            .ok_or_else(|| DecoderError::Open("no audio track found".into()))?;

        let track_id = track.id;
        let channels = track
            .codec_params
            .channels
            .map(|c| c.count() as u16)
            .ok_or_else(|| DecoderError::Open("track has no channel layout".into()))?;
        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| DecoderError::Open("track has no sample rate".into()))?;
        let total_frames = track.codec_params.n_frames;

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| DecoderError::Open(format!("no decoder for this codec: {e}")))?;

        Ok(FileDecoder {
            format,
            decoder,
            track_id,
            info: AudioInfo { channels, sample_rate, total_frames },
            pending: Vec::new(),
            cursor_frames: 0,
        })
    }

    fn decode_next_packet(&mut self) -> Result<Option<Vec<f32>>, DecoderError> {
        loop {
            let packet = match self.format.next_packet() {
                Ok(packet) => packet,
                Err(SymphoniaError::IoError(e))
                    if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                {
                    return Ok(None)
                }
                Err(SymphoniaError::ResetRequired) => {
                    self.decoder.reset();
                    continue;
                }
                Err(e) => return Err(DecoderError::Read(e.to_string())),
            };

            if packet.track_id() != self.track_id {
                continue;
            }

            match self.decoder.decode(&packet) {
                Ok(decoded) => {
                    let mut samples = Vec::new();
                    interleave(&decoded, &mut samples);
                    return Ok(Some(samples));
                }
                Err(SymphoniaError::DecodeError(_)) => continue,
                Err(e) => return Err(DecoderError::Read(e.to_string())),
            }
        }
    }
}

impl Decoder for FileDecoder {
    fn info(&self) -> AudioInfo {
        self.info
    }

    fn read_frames(&mut self, dst: &mut [f32], frame_count: usize) -> Result<usize, DecoderError> {
        let channels = usize::from(self.info.channels);
        let want_samples = frame_count * channels;
        let mut written = 0;

        while written < want_samples {
            if self.pending.is_empty() {
                match self.decode_next_packet()? {
                    Some(samples) => self.pending = samples,
                    None => break,
                }
            }

            let take = (want_samples - written).min(self.pending.len());
            dst[written..written + take].copy_from_slice(&self.pending[..take]);
            self.pending.drain(..take);
            written += take;
        }

        let frames_written = written / channels;
        self.cursor_frames += frames_written as u64;
        Ok(frames_written)
    }

    fn seek(&mut self, offset: i64, whence: SeekFrom) -> Result<u64, DecoderError> {
        let total_frames = self.info.total_frames.unwrap_or(0) as i64;

        let base = match whence {
            SeekFrom::Begin => 0,
            SeekFrom::Current => self.cursor_frames as i64,
            SeekFrom::End => total_frames,
        };

        let target = base
            .checked_add(offset)
            .ok_or_else(|| DecoderError::Seek("overflow computing seek target".into()))?;

        if target < 0 {
            return Err(DecoderError::Seek(format!("seek target {target} is negative")));
        }

        let time = Time::from(target as f64 / f64::from(self.info.sample_rate));
        let seeked = self
            .format
            .seek(SeekMode::Accurate, SeekTo::Time { time, track_id: Some(self.track_id) })
            .map_err(|e| DecoderError::Seek(e.to_string()))?;

        self.decoder.reset();
        self.pending.clear();
        self.cursor_frames = seeked.actual_ts;
        Ok(self.cursor_frames)
    }
}

fn interleave(decoded: &AudioBufferRef, out: &mut Vec<f32>) {
    macro_rules! push_channels {
        ($buf:expr, $convert:expr) => {{
            let channels = $buf.spec().channels.count();
            let frames = $buf.frames();
            out.reserve(frames * channels);
            for frame in 0..frames {
                for ch in 0..channels {
                    out.push($convert($buf.chan(ch)[frame]));
                }
            }
        }};
    }

    match decoded {
        AudioBufferRef::F32(buf) => push_channels!(buf, |s: f32| s),
        AudioBufferRef::U8(buf) => push_channels!(buf, |s: u8| (f32::from(s) - 128.0) / 128.0),
        AudioBufferRef::S16(buf) => push_channels!(buf, |s: i16| f32::from(s) / 32768.0),
        AudioBufferRef::S32(buf) => push_channels!(buf, |s: i32| s as f32 / 2147483648.0),
        AudioBufferRef::F64(buf) => push_channels!(buf, |s: f64| s as f32),
        _ => log::warn!("unsupported sample format in decoded packet, dropping it"),
    }
}
