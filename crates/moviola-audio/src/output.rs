//! Device output through cpal.

use crate::streaming::StreamingAudioClip;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use moviola_core::{MoviolaError, Result};
use std::sync::Arc;
use tracing::{error, info, warn};

/// An open output stream draining a stereo clip.
///
/// The stream stops when this is dropped. `cpal::Stream` is not `Send` on
/// every platform, so keep this on the thread that opened it.
pub struct AudioOutput {
    _stream: cpal::Stream,
    sample_rate: u32,
    channels: u16,
}

impl AudioOutput {
    /// Open the default output device and start draining `source`.
    ///
    /// `source` must be stereo; extra device channels get silence.
    pub fn open(source: Arc<StreamingAudioClip>, expected_rate: u32) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| MoviolaError::Audio("No output device available".to_string()))?;

        let supported = device
            .default_output_config()
            .map_err(|e| MoviolaError::Audio(format!("No output config: {}", e)))?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(MoviolaError::Audio(format!(
                "Device sample format {:?} is not supported",
                supported.sample_format()
            )));
        }

        let config: cpal::StreamConfig = supported.config();
        let sample_rate = config.sample_rate.0;
        let channels = config.channels;
        if sample_rate != expected_rate {
            warn!(
                "Device runs at {} Hz, engine at {} Hz; playback speed will be off",
                sample_rate, expected_rate
            );
        }

        let device_channels = channels as usize;
        let mut stereo = Vec::new();
        let stream = device
            .build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let frames = data.len() / device_channels.max(1);
                    stereo.resize(frames * 2, 0.0);
                    let read = source.read(&mut stereo);
                    stereo[read..].fill(0.0);

                    for (dst, src) in data
                        .chunks_exact_mut(device_channels.max(1))
                        .zip(stereo.chunks_exact(2))
                    {
                        for (i, sample) in dst.iter_mut().enumerate() {
                            *sample = match (device_channels, i) {
                                (1, 0) => (src[0] + src[1]) * 0.5,
                                (_, 0) => src[0],
                                (_, 1) => src[1],
                                _ => 0.0,
                            };
                        }
                    }
                },
                |err| error!("Audio output error: {}", err),
                None,
            )
            .map_err(|e| MoviolaError::Audio(format!("Failed to build stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| MoviolaError::Audio(format!("Failed to start stream: {}", e)))?;

        info!("Audio output open: {} Hz, {} channels", sample_rate, channels);
        Ok(Self {
            _stream: stream,
            sample_rate,
            channels,
        })
    }

    /// Device sample rate.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Device channel count.
    pub fn channels(&self) -> u16 {
        self.channels
    }
}
