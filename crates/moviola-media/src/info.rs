//! Stream metadata reported by a decoder.

use moviola_core::{Size, Time};
use serde::{Deserialize, Serialize};

/// Kind of media track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StreamType {
    Video,
    Audio,
}

/// Information about a video stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoStreamInfo {
    pub size: Size,
    pub frame_rate: f64,
}

/// Information about an audio stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioStreamInfo {
    pub sample_rate: u32,
    pub channels: u16,
}

/// Tracks of an opened movie.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaInfo {
    pub video: Option<VideoStreamInfo>,
    pub audio: Option<AudioStreamInfo>,
    /// Duration in seconds, if known.
    pub duration: Option<Time>,
}

impl MediaInfo {
    /// Check if the movie has video.
    pub fn has_video(&self) -> bool {
        self.video.is_some()
    }

    /// Check if the movie has audio.
    pub fn has_audio(&self) -> bool {
        self.audio.is_some()
    }

    /// Video dimensions, or zero if there is no video track.
    pub fn video_size(&self) -> Size {
        self.video.as_ref().map(|v| v.size).unwrap_or_default()
    }

    /// Stream types in track order (video first).
    pub fn stream_types(&self) -> Vec<StreamType> {
        let mut types = Vec::with_capacity(2);
        if self.has_video() {
            types.push(StreamType::Video);
        }
        if self.has_audio() {
            types.push(StreamType::Audio);
        }
        types
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stream_types_order() {
        let info = MediaInfo {
            video: Some(VideoStreamInfo {
                size: Size::new(320, 240),
                frame_rate: 30.0,
            }),
            audio: Some(AudioStreamInfo {
                sample_rate: 48_000,
                channels: 2,
            }),
            duration: Some(1.0),
        };
        assert_eq!(info.stream_types(), vec![StreamType::Video, StreamType::Audio]);
        assert_eq!(info.video_size(), Size::new(320, 240));
    }

    #[test]
    fn test_audio_only() {
        let info = MediaInfo {
            audio: Some(AudioStreamInfo {
                sample_rate: 44_100,
                channels: 1,
            }),
            ..Default::default()
        };
        assert!(!info.has_video());
        assert_eq!(info.video_size(), Size::default());
        assert_eq!(info.stream_types(), vec![StreamType::Audio]);
    }
}
