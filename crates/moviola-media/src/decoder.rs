//! Decoder interface driven by the movie player.
//!
//! The player's decode thread calls `request_*_frame` whenever its buffers
//! run low. A decoder answers by pushing zero or more frames into the
//! `FrameSink`, possibly later and from another thread, and flags
//! end-of-stream through the sink.

use crate::info::{MediaInfo, StreamType};
use moviola_core::{FrameBuffer, Result, Time};

/// Receiver of decoded data.
pub trait FrameSink: Send + Sync {
    /// A decoded video frame to show at `time`.
    fn on_video_frame_available(&self, time: Time, frame: FrameBuffer);

    /// Interleaved audio samples starting at `time`.
    fn on_audio_frame_available(&self, time: Time, samples: &[f32]);

    /// No more data will arrive for this stream.
    fn set_eof(&self, stream: StreamType);
}

/// A source of decoded movie data.
pub trait MovieDecoder: Send {
    fn info(&self) -> MediaInfo;

    fn request_video_frame(&mut self, sink: &dyn FrameSink) -> Result<()>;

    fn request_audio_frame(&mut self, sink: &dyn FrameSink) -> Result<()>;

    /// Rewind to the start. Called after the player resets.
    fn on_reset(&mut self) {}
}
