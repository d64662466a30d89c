//! State shared between the update thread, the decode driver and the ingest
//! worker. Everything here lives behind one `parking_lot::Mutex`.

use crate::config::PlayerConfig;
use crate::frame_queue::FrameQueue;
use crate::ingest::FrameMessage;
use crate::state::PlayerState;
use crate::stream::Stream;
use crossbeam_channel::Sender;
use moviola_audio::StreamingAudioClip;
use moviola_gpu::{Texture, TexturePool};
use moviola_media::{MediaInfo, StreamType};
use parking_lot::Mutex;
use std::sync::Arc;

pub(crate) type SharedHandle = Arc<Mutex<SharedState>>;

/// Buffer fill levels above which the decoder is left alone.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HighWater {
    pub video_frames: usize,
    pub audio_samples: usize,
}

impl From<&PlayerConfig> for HighWater {
    fn from(config: &PlayerConfig) -> Self {
        Self {
            video_frames: config.video_high_water_frames,
            audio_samples: config.audio_high_water_samples,
        }
    }
}

pub(crate) struct SharedState {
    pub state: PlayerState,
    pub streams: Vec<Stream>,
    pub queue: FrameQueue,
    /// Frames handed to the ingest channel but not queued yet.
    pub in_flight: usize,
    pub recycle: TexturePool,
    pub clip: Option<Arc<StreamingAudioClip>>,
    /// Present while the ingest worker runs.
    pub ingest_tx: Option<Sender<FrameMessage>>,
    pub high_water: HighWater,
}

impl SharedState {
    pub fn new(info: &MediaInfo, config: &PlayerConfig) -> Self {
        Self {
            state: PlayerState::Paused,
            streams: info.stream_types().into_iter().map(Stream::new).collect(),
            queue: FrameQueue::new(),
            in_flight: 0,
            recycle: TexturePool::new(config.recycle_pool_capacity),
            clip: None,
            ingest_tx: None,
            high_water: HighWater::from(config),
        }
    }

    /// First video stream.
    pub fn video_stream(&self) -> Option<&Stream> {
        self.streams
            .iter()
            .find(|s| s.stream_type == StreamType::Video)
    }

    /// Last audio stream.
    pub fn audio_stream(&self) -> Option<&Stream> {
        self.streams
            .iter()
            .rev()
            .find(|s| s.stream_type == StreamType::Audio)
    }

    /// Frames queued plus frames on their way to the queue.
    pub fn buffered_frames(&self) -> usize {
        self.queue.len() + self.in_flight
    }

    pub fn needs_more_video_frames(&self) -> bool {
        if !self.state.is_active() {
            return false;
        }
        match self.video_stream() {
            Some(stream) => !stream.eof && self.buffered_frames() < self.high_water.video_frames,
            None => false,
        }
    }

    pub fn needs_more_audio_frames(&self) -> bool {
        if !self.state.is_active() {
            return false;
        }
        let Some(stream) = self.audio_stream() else {
            return false;
        };
        if stream.eof {
            return false;
        }
        match &self.clip {
            Some(clip) => clip.samples_left() < self.high_water.audio_samples,
            None => false,
        }
    }

    /// True when playback has run out of material to present.
    pub fn is_drained(&self) -> bool {
        if self.needs_more_video_frames() || self.buffered_frames() > 0 {
            return false;
        }
        match self.video_stream() {
            Some(_) => true,
            // Audio-only movies finish when the clip plays out
            None => match (self.audio_stream(), &self.clip) {
                (Some(stream), Some(clip)) => stream.eof && clip.samples_left() == 0,
                _ => true,
            },
        }
    }

    /// Mark every stream of `stream_type` as finished.
    pub fn set_eof(&mut self, stream_type: StreamType) {
        for stream in self.streams.iter_mut().filter(|s| s.stream_type == stream_type) {
            stream.eof = true;
        }
    }

    pub fn set_playing(&mut self, playing: bool) {
        for stream in &mut self.streams {
            stream.playing = playing;
        }
    }

    /// Give a finished-with frame texture back for reuse.
    ///
    /// Textures mid-upload are dropped instead so a recycled texture is
    /// never written by two loads at once.
    pub fn recycle(&mut self, texture: Arc<dyn Texture>) {
        if texture.is_loaded() {
            self.recycle.release(texture);
        }
    }

    /// Drop buffered media and rewind to the initial state.
    pub fn clear(&mut self) {
        self.state = PlayerState::Paused;
        let drained: Vec<_> = self.queue.drain().collect();
        for frame in drained {
            self.recycle(frame.texture);
        }
        self.in_flight = 0;
        self.clip = None;
        for stream in &mut self.streams {
            *stream = Stream::new(stream.stream_type);
        }
    }
}
