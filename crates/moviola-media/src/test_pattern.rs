//! Synthetic decoder producing moving colour bars and a sine tone.

use crate::decoder::{FrameSink, MovieDecoder};
use crate::info::{AudioStreamInfo, MediaInfo, StreamType, VideoStreamInfo};
use moviola_core::{FrameBuffer, MoviolaError, Result, Size, Time};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Shape of the synthetic movie.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TestPatternConfig {
    pub size: Size,
    pub frame_rate: f64,
    /// Length in seconds.
    pub duration: Time,
    /// `None` for a silent movie.
    pub sample_rate: Option<u32>,
    pub channels: u16,
    pub tone_hz: f32,
    /// Sample frames produced per audio request.
    pub audio_chunk_frames: usize,
}

impl Default for TestPatternConfig {
    fn default() -> Self {
        Self {
            size: Size::new(640, 360),
            frame_rate: 24.0,
            duration: 5.0,
            sample_rate: Some(48_000),
            channels: 2,
            tone_hz: 440.0,
            audio_chunk_frames: 1024,
        }
    }
}

/// Whole units of `rate` needed to cover `duration`, ignoring float noise.
fn frames_in(duration: Time, rate: f64) -> u64 {
    (duration * rate - 1e-6).ceil().max(0.0) as u64
}

/// Decoder that synthesizes its output.
pub struct TestPatternDecoder {
    config: TestPatternConfig,
    next_frame: u64,
    next_sample_frame: u64,
}

impl TestPatternDecoder {
    pub fn new(config: TestPatternConfig) -> Result<Self> {
        if config.size.is_empty() || config.frame_rate <= 0.0 {
            return Err(MoviolaError::InvalidParameter(format!(
                "test pattern needs a non-empty size and positive frame rate, got {} @ {}",
                config.size, config.frame_rate
            )));
        }
        if config.sample_rate == Some(0) || config.channels == 0 {
            return Err(MoviolaError::InvalidParameter(
                "test pattern audio needs a sample rate and channels".to_string(),
            ));
        }

        info!(
            "Test pattern movie: {} @ {} fps, {:.2}s",
            config.size, config.frame_rate, config.duration
        );
        Ok(Self {
            config,
            next_frame: 0,
            next_sample_frame: 0,
        })
    }

    /// Total number of video frames.
    pub fn frame_count(&self) -> u64 {
        frames_in(self.config.duration, self.config.frame_rate)
    }

    /// Total number of audio sample frames.
    pub fn sample_frame_count(&self) -> u64 {
        self.config
            .sample_rate
            .map(|rate| frames_in(self.config.duration, rate as f64))
            .unwrap_or(0)
    }

    /// Index of the next video frame to be produced.
    pub fn current_frame(&self) -> u64 {
        self.next_frame
    }
}

impl MovieDecoder for TestPatternDecoder {
    fn info(&self) -> MediaInfo {
        MediaInfo {
            video: Some(VideoStreamInfo {
                size: self.config.size,
                frame_rate: self.config.frame_rate,
            }),
            audio: self.config.sample_rate.map(|sample_rate| AudioStreamInfo {
                sample_rate,
                channels: self.config.channels,
            }),
            duration: Some(self.config.duration),
        }
    }

    fn request_video_frame(&mut self, sink: &dyn FrameSink) -> Result<()> {
        let total = self.frame_count();
        if self.next_frame >= total {
            sink.set_eof(StreamType::Video);
            return Ok(());
        }

        let n = self.next_frame;
        let time = n as f64 / self.config.frame_rate;
        let size = self.config.size;
        let offset = (n * 4 % size.width as u64) as u32;
        sink.on_video_frame_available(time, FrameBuffer::test_pattern(size.width, size.height, offset));
        debug!("Test pattern frame {} at {:.3}s", n, time);

        self.next_frame += 1;
        if self.next_frame >= total {
            sink.set_eof(StreamType::Video);
        }
        Ok(())
    }

    fn request_audio_frame(&mut self, sink: &dyn FrameSink) -> Result<()> {
        let Some(rate) = self.config.sample_rate else {
            sink.set_eof(StreamType::Audio);
            return Ok(());
        };
        let total = self.sample_frame_count();
        let frames = (total.saturating_sub(self.next_sample_frame))
            .min(self.config.audio_chunk_frames as u64);

        if frames > 0 {
            let channels = self.config.channels as usize;
            let start = self.next_sample_frame;
            let step = std::f64::consts::TAU * self.config.tone_hz as f64 / rate as f64;
            let mut samples = Vec::with_capacity(frames as usize * channels);
            for i in start..start + frames {
                let s = ((i as f64 * step).sin() * 0.2) as f32;
                samples.extend(std::iter::repeat(s).take(channels));
            }
            sink.on_audio_frame_available(start as f64 / rate as f64, &samples);
            self.next_sample_frame += frames;
        }

        if self.next_sample_frame >= total {
            sink.set_eof(StreamType::Audio);
        }
        Ok(())
    }

    fn on_reset(&mut self) {
        self.next_frame = 0;
        self.next_sample_frame = 0;
    }
}
