//! The movie player.

use crate::config::PlayerConfig;
use crate::driver::{DecodeDriver, SharedDecoder};
use crate::frame_queue::PendingFrame;
use crate::ingest::IngestWorker;
use crate::presenter::Presenter;
use crate::shared::{SharedHandle, SharedState};
use crate::sink::MovieSink;
use crate::state::PlayerState;
use crate::stream::Stream;
use moviola_audio::{AudioBackend, AudioPosition, PlaybackHandle, StreamingAudioClip};
use moviola_core::{Result, Size, Time};
use moviola_gpu::{RenderContext, Sprite, VideoBackend};
use moviola_media::MovieDecoder;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Called after the player has been reset, for decoder-specific cleanup
/// beyond `MovieDecoder::on_reset`.
pub trait ResetHook: Send {
    fn on_reset(&mut self);
}

impl<F: FnMut() + Send> ResetHook for F {
    fn on_reset(&mut self) {
        self()
    }
}

/// Plays one movie through a video and an audio backend.
///
/// `update`, `render` and the control methods are meant to be called from
/// a single thread (normally the game or UI loop). Decoding and texture
/// uploads happen on two background threads owned by the player.
pub struct MoviePlayer {
    config: PlayerConfig,
    video: Arc<dyn VideoBackend>,
    audio: Arc<dyn AudioBackend>,
    decoder: SharedDecoder,
    shared: SharedHandle,
    audio_channels: u16,
    video_size: Size,
    time: Time,
    current: Option<PendingFrame>,
    presenter: Presenter,
    audio_handle: Option<Arc<dyn PlaybackHandle>>,
    reset_hook: Option<Box<dyn ResetHook>>,
    // Declared before `ingest` so the driver is joined first on drop
    driver: Option<DecodeDriver>,
    ingest: Option<IngestWorker>,
}

impl MoviePlayer {
    /// Create a paused player for `decoder`.
    ///
    /// No threads run and nothing is allocated on the backends until the
    /// first `play`.
    pub fn new(
        video: Arc<dyn VideoBackend>,
        audio: Arc<dyn AudioBackend>,
        decoder: Box<dyn MovieDecoder>,
        config: PlayerConfig,
    ) -> Result<Self> {
        config.validate()?;
        let info = decoder.info();
        let audio_channels = info
            .audio
            .as_ref()
            .map(|a| a.channels)
            .filter(|&c| c > 0)
            .unwrap_or(config.audio_channels);

        info!(
            "Movie player: video {}, audio {}",
            info.video
                .as_ref()
                .map(|v| format!("{} @ {:.2} fps", v.size, v.frame_rate))
                .unwrap_or_else(|| "none".to_string()),
            info.audio
                .as_ref()
                .map(|a| format!("{} Hz x{}", a.sample_rate, a.channels))
                .unwrap_or_else(|| "none".to_string()),
        );

        let shared = Arc::new(Mutex::new(SharedState::new(&info, &config)));
        Ok(Self {
            video,
            audio,
            decoder: Arc::new(Mutex::new(decoder)),
            shared,
            audio_channels,
            video_size: info.video_size(),
            time: 0.0,
            current: None,
            presenter: Presenter::new(),
            audio_handle: None,
            reset_hook: None,
            driver: None,
            ingest: None,
            config,
        })
    }

    /// Run `hook` after every reset.
    pub fn with_reset_hook(mut self, hook: impl ResetHook + 'static) -> Self {
        self.reset_hook = Some(Box::new(hook));
        self
    }

    /// Start (or resume) playback. Does nothing unless paused.
    ///
    /// Buffers fill first; the clock starts once both are at their
    /// high-water marks. On error the player stays paused.
    pub fn play(&mut self) -> Result<()> {
        if self.state() != PlayerState::Paused {
            return Ok(());
        }

        if !self.video_size.is_empty() {
            self.presenter.prepare(self.video.as_ref(), self.video_size)?;
        }
        self.start_workers()?;

        let mut shared = self.shared.lock();
        if shared.audio_stream().is_some() && shared.clip.is_none() {
            shared.clip = Some(Arc::new(StreamingAudioClip::with_capacity(
                self.audio_channels,
                self.config.audio_buffer_frames,
            )));
        }
        shared.set_playing(true);
        shared.state = PlayerState::StartingToPlay;
        info!("Movie starting at {:.3}s", self.time);
        Ok(())
    }

    /// Pause playback. Does nothing unless playing.
    ///
    /// Buffered frames and audio are kept, so `play` resumes where this
    /// left off.
    pub fn pause(&mut self) {
        {
            let mut shared = self.shared.lock();
            if shared.state != PlayerState::Playing {
                return;
            }
            shared.state = PlayerState::Paused;
            shared.set_playing(false);
        }
        self.stop_audio();
        info!("Movie paused at {:.3}s", self.time);
    }

    /// Stop everything and rewind to the start.
    ///
    /// Background threads are joined before any state is cleared, so no
    /// frame from before the reset can show up afterwards.
    pub fn reset(&mut self) {
        self.stop_workers();
        self.stop_audio();

        self.shared.lock().clear();
        if let Some(frame) = self.current.take() {
            self.shared.lock().recycle(frame.texture);
        }
        self.time = 0.0;

        self.decoder.lock().on_reset();
        if let Some(hook) = self.reset_hook.as_mut() {
            hook.on_reset();
        }
        info!("Movie reset");
    }

    /// Advance the clock by `dt` seconds and promote due frames.
    ///
    /// Finished is only entered from a tick that began in Playing.
    pub fn update(&mut self, dt: Time) {
        let (start_audio, finished) = {
            let mut shared = self.shared.lock();
            let was_playing = shared.state == PlayerState::Playing;
            if was_playing {
                self.time += dt;
            }
            if !shared.state.is_active() {
                return;
            }

            // Buffer fullness is judged before this tick's promotion
            let start_audio = if shared.state == PlayerState::StartingToPlay
                && !shared.needs_more_video_frames()
                && !shared.needs_more_audio_frames()
            {
                shared.state = PlayerState::Playing;
                info!("Movie playing, {} frames buffered", shared.queue.len());
                shared.clip.clone()
            } else {
                None
            };

            // Catch up: the last due frame wins, skipped ones are recycled
            while let Some(frame) = shared.queue.pop_due(self.time) {
                if let Some(previous) = self.current.replace(frame) {
                    shared.recycle(previous.texture);
                }
            }

            let finished = was_playing && shared.is_drained();
            if finished {
                shared.state = PlayerState::Finished;
                info!("Movie finished at {:.3}s", self.time);
            }
            (start_audio, finished)
        };

        if finished {
            self.stop_audio();
        } else if let Some(clip) = start_audio {
            self.start_audio(clip);
        }
    }

    /// Copy the current frame into the render target.
    ///
    /// A frame still uploading is left for the next call. Once drawn, its
    /// texture goes back to the recycle pool.
    pub fn render(&mut self, rc: &mut dyn RenderContext) -> Result<()> {
        let Some(frame) = &self.current else {
            return Ok(());
        };
        if !frame.texture.is_loaded() {
            return Ok(());
        }

        if self.presenter.present(rc, &frame.texture, self.video_size)? {
            if let Some(frame) = self.current.take() {
                self.shared.lock().recycle(frame.texture);
            }
        }
        Ok(())
    }

    /// Sprite showing the last rendered frame.
    pub fn sprite(&self) -> Sprite {
        self.presenter.sprite(self.video_size)
    }

    pub fn state(&self) -> PlayerState {
        self.shared.lock().state
    }

    pub fn size(&self) -> Size {
        self.video_size
    }

    /// Override the size reported by the decoder. Takes effect on the
    /// next `play`.
    pub fn set_video_size(&mut self, size: Size) {
        self.video_size = size;
    }

    /// Playback clock in seconds.
    pub fn time(&self) -> Time {
        self.time
    }

    pub fn video_backend(&self) -> &Arc<dyn VideoBackend> {
        &self.video
    }

    pub fn audio_backend(&self) -> &Arc<dyn AudioBackend> {
        &self.audio
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn needs_more_video_frames(&self) -> bool {
        self.shared.lock().needs_more_video_frames()
    }

    pub fn needs_more_audio_frames(&self) -> bool {
        self.shared.lock().needs_more_audio_frames()
    }

    /// Frames waiting in the queue.
    pub fn queued_frames(&self) -> usize {
        self.shared.lock().queue.len()
    }

    pub fn has_current_frame(&self) -> bool {
        self.current.is_some()
    }

    /// Timestamp of the frame awaiting render.
    pub fn current_frame_time(&self) -> Option<Time> {
        self.current.as_ref().map(|f| f.time)
    }

    pub fn streams(&self) -> Vec<Stream> {
        self.shared.lock().streams.clone()
    }

    /// The clip decoded audio is streamed into, while one exists.
    pub fn audio_clip(&self) -> Option<Arc<StreamingAudioClip>> {
        self.shared.lock().clip.clone()
    }

    pub fn is_audio_playing(&self) -> bool {
        self.audio_handle.as_ref().is_some_and(|h| h.is_playing())
    }

    /// Sink for decoders that deliver from threads of their own.
    pub fn sink(&self) -> MovieSink {
        MovieSink::new(Arc::clone(&self.shared))
    }

    fn start_workers(&mut self) -> Result<()> {
        if self.ingest.is_none() {
            self.ingest = Some(IngestWorker::start(
                Arc::clone(&self.shared),
                Arc::clone(&self.video),
                self.config.ingest_channel_capacity(),
            )?);
        }
        if self.driver.is_none() {
            match DecodeDriver::start(
                Arc::clone(&self.decoder),
                Arc::clone(&self.shared),
                self.config.idle_interval(),
            ) {
                Ok(driver) => self.driver = Some(driver),
                Err(e) => {
                    self.stop_workers();
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    fn stop_workers(&mut self) {
        // Driver first: it may be blocked handing a frame to the worker
        if let Some(mut driver) = self.driver.take() {
            driver.stop();
        }
        if let Some(mut ingest) = self.ingest.take() {
            ingest.stop();
        }
    }

    fn start_audio(&mut self, clip: Arc<StreamingAudioClip>) {
        match self
            .audio
            .play(clip, AudioPosition::ui(), self.config.initial_volume)
        {
            Ok(handle) => {
                debug!("Movie audio started");
                self.audio_handle = Some(handle);
            }
            Err(e) => warn!("Movie audio failed to start, continuing silent: {}", e),
        }
    }

    fn stop_audio(&mut self) {
        if let Some(handle) = self.audio_handle.take() {
            handle.stop();
        }
    }
}

impl Drop for MoviePlayer {
    fn drop(&mut self) {
        self.stop_workers();
        self.stop_audio();
    }
}
