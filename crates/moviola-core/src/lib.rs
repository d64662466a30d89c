//! Moviola Core - Foundation types for movie playback
//!
//! This crate provides the fundamental types shared by the player and its
//! backends:
//! - Error type and result alias
//! - Frame buffers and pixel formats handed over by decoders
//! - Integer geometry for video sizes and viewports

pub mod error;
pub mod frame;
pub mod geometry;

pub use error::{MoviolaError, Result};
pub use frame::{FrameBuffer, FramePlane, PixelFormat, SharedFrameBuffer};
pub use geometry::{Rect, Size};

/// Presentation time in seconds.
pub type Time = f64;

/// Default buffering thresholds for the movie player.
pub mod buffering {
    use std::time::Duration;

    /// Decoded video frames to hold before decode requests stop.
    pub const VIDEO_HIGH_WATER_FRAMES: usize = 7;

    /// Buffered audio samples (per channel) before decode requests stop.
    pub const AUDIO_HIGH_WATER_SAMPLES: usize = 20_000;

    /// How long the decode driver sleeps when there is nothing to request.
    pub const DRIVER_IDLE_INTERVAL: Duration = Duration::from_millis(2);

    /// Ring capacity of a streaming clip, in sample frames (2s at 48kHz).
    pub const AUDIO_BUFFER_FRAMES: usize = 96_000;

    /// Volume used when playback starts.
    pub const INITIAL_VOLUME: f32 = 0.5;
}
