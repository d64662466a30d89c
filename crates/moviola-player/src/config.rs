//! Player configuration.

use moviola_core::buffering;
use moviola_core::{MoviolaError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Buffering and playback settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Frames queued (or in flight) before video requests stop.
    pub video_high_water_frames: usize,
    /// Samples per channel buffered before audio requests stop.
    pub audio_high_water_samples: usize,
    /// Decode driver sleep when idle, in milliseconds.
    pub idle_interval_ms: u64,
    /// Volume audio starts at.
    pub initial_volume: f32,
    /// Clip channel count when the decoder doesn't report one.
    pub audio_channels: u16,
    /// Streaming clip capacity in sample frames.
    pub audio_buffer_frames: usize,
    /// Spare frame textures kept for reuse.
    pub recycle_pool_capacity: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            video_high_water_frames: buffering::VIDEO_HIGH_WATER_FRAMES,
            audio_high_water_samples: buffering::AUDIO_HIGH_WATER_SAMPLES,
            idle_interval_ms: buffering::DRIVER_IDLE_INTERVAL.as_millis() as u64,
            initial_volume: buffering::INITIAL_VOLUME,
            audio_channels: 2,
            audio_buffer_frames: buffering::AUDIO_BUFFER_FRAMES,
            recycle_pool_capacity: buffering::VIDEO_HIGH_WATER_FRAMES + 1,
        }
    }
}

impl PlayerConfig {
    /// Decode driver idle sleep.
    pub fn idle_interval(&self) -> Duration {
        Duration::from_millis(self.idle_interval_ms)
    }

    /// Capacity of the frame-ready channel feeding the ingest worker.
    ///
    /// Larger than the high-water mark so the decoder never blocks on it in
    /// normal operation.
    pub fn ingest_channel_capacity(&self) -> usize {
        self.video_high_water_frames.max(1) * 2
    }

    /// Reject settings playback can't work with.
    pub fn validate(&self) -> Result<()> {
        if self.video_high_water_frames == 0 {
            return Err(MoviolaError::InvalidParameter(
                "video_high_water_frames must be at least 1".to_string(),
            ));
        }
        if self.audio_channels == 0 {
            return Err(MoviolaError::InvalidParameter(
                "audio_channels must be at least 1".to_string(),
            ));
        }
        if self.audio_buffer_frames < self.audio_high_water_samples {
            return Err(MoviolaError::InvalidParameter(format!(
                "audio_buffer_frames ({}) can't hold the high-water mark ({})",
                self.audio_buffer_frames, self.audio_high_water_samples
            )));
        }
        if !(0.0..=1.0).contains(&self.initial_volume) {
            return Err(MoviolaError::InvalidParameter(format!(
                "initial_volume {} outside 0..1",
                self.initial_volume
            )));
        }
        Ok(())
    }
}
