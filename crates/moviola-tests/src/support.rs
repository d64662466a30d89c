//! Shared fixtures.

use moviola_audio::AudioEngine;
use moviola_core::{Result, Size};
use moviola_gpu::SoftwareVideoBackend;
use moviola_media::{
    AudioStreamInfo, FrameSink, MediaInfo, MovieDecoder, TestPatternConfig, TestPatternDecoder,
    VideoStreamInfo,
};
use moviola_player::{MoviePlayer, PlayerConfig};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Decoder that produces nothing; tests push media through the sink.
pub struct ManualDecoder {
    pub info: MediaInfo,
}

impl ManualDecoder {
    pub fn new(video: bool, audio: bool) -> Self {
        Self {
            info: MediaInfo {
                video: video.then(|| VideoStreamInfo {
                    size: Size::new(16, 8),
                    frame_rate: 1.0,
                }),
                audio: audio.then(|| AudioStreamInfo {
                    sample_rate: 48_000,
                    channels: 2,
                }),
                duration: None,
            },
        }
    }
}

impl MovieDecoder for ManualDecoder {
    fn info(&self) -> MediaInfo {
        self.info.clone()
    }

    fn request_video_frame(&mut self, _sink: &dyn FrameSink) -> Result<()> {
        thread::sleep(Duration::from_millis(1));
        Ok(())
    }

    fn request_audio_frame(&mut self, _sink: &dyn FrameSink) -> Result<()> {
        thread::sleep(Duration::from_millis(1));
        Ok(())
    }
}

pub struct Rig {
    pub player: MoviePlayer,
    pub video: Arc<SoftwareVideoBackend>,
    pub audio: Arc<AudioEngine>,
}

pub fn rig(decoder: Box<dyn MovieDecoder>) -> Rig {
    let video = Arc::new(SoftwareVideoBackend::new());
    let audio = Arc::new(AudioEngine::default());
    let player = MoviePlayer::new(
        video.clone(),
        audio.clone(),
        decoder,
        PlayerConfig::default(),
    )
    .unwrap();
    Rig {
        player,
        video,
        audio,
    }
}

pub fn manual_rig(video: bool, audio: bool) -> Rig {
    rig(Box::new(ManualDecoder::new(video, audio)))
}

/// Short, small test-pattern movie: 10 frames at 10 fps with stereo audio.
pub fn pattern_decoder() -> TestPatternDecoder {
    TestPatternDecoder::new(TestPatternConfig {
        size: Size::new(32, 16),
        frame_rate: 10.0,
        duration: 1.0,
        sample_rate: Some(48_000),
        channels: 2,
        tone_hz: 440.0,
        audio_chunk_frames: 4096,
    })
    .unwrap()
}

/// Poll `cond` until it holds or five seconds pass.
pub fn wait_for(cond: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    false
}
