//! Picks a `cpal` stream configuration matching the decoder's format: float
//! samples, the file's own channel count and sample rate, and a buffer size
//! fixed to a single block so the callback always receives exactly one
//! block per invocation.

use cpal::traits::DeviceTrait;
use cpal::{BufferSize, SampleFormat, StreamConfig, SupportedBufferSize};

pub const SAMPLE_FORMAT: SampleFormat = SampleFormat::F32;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to enumerate supported stream configs: {0}")]
    Enumerate(#[from] cpal::SupportedStreamConfigsError),
    #[error("device has no supported stream config for {channels} channels at {sample_rate}Hz")]
    NoSupportedStreamConfig { channels: u16, sample_rate: u32 },
    #[error(
        "device's supported buffer sizes {min}..={max} frames don't include the exact block \
         size of {frames_per_block} frames the Ring requires"
    )]
    BlockSizeNotSupported { frames_per_block: usize, min: u32, max: u32 },
}

pub fn for_device(
    device: &cpal::Device,
    channels: u16,
    sample_rate: u32,
    frames_per_block: usize,
) -> Result<StreamConfig, ConfigError> {
    let supported = device
        .supported_output_configs()?
        .filter(|c| c.sample_format() == SAMPLE_FORMAT)
        .filter(|c| c.channels() == channels)
        .find(|c| {
            let range = c.min_sample_rate().0..=c.max_sample_rate().0;
            range.contains(&sample_rate)
        })
        .ok_or(ConfigError::NoSupportedStreamConfig { channels, sample_rate })?;

    // The Ring's block length and the stream's buffer size must match
    // exactly (spec §6: "exact buffer size FRAMES_PER_BLOCK"), or the
    // callback will be invoked with a frame count the Ring's consumer
    // side was never built to hand out — widening the buffer to the
    // device's minimum instead of failing would panic on the realtime
    // thread the first time it ran.
    match supported.buffer_size() {
        SupportedBufferSize::Range { min, max } if (*min..=*max).contains(&(frames_per_block as u32)) => {}
        SupportedBufferSize::Range { min, max } => {
            return Err(ConfigError::BlockSizeNotSupported {
                frames_per_block,
                min: *min,
                max: *max,
            })
        }
        SupportedBufferSize::Unknown => {}
    }

    Ok(StreamConfig {
        channels,
        sample_rate: cpal::SampleRate(sample_rate),
        buffer_size: BufferSize::Fixed(frames_per_block as u32),
    })
}
