//! Per-track playback flags.

use moviola_media::StreamType;

/// One media track of the movie being played.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stream {
    pub stream_type: StreamType,
    /// Set by play, cleared by pause.
    pub playing: bool,
    /// Set by the decoder once the track has no more data.
    pub eof: bool,
}

impl Stream {
    pub fn new(stream_type: StreamType) -> Self {
        Self {
            stream_type,
            playing: false,
            eof: false,
        }
    }
}
