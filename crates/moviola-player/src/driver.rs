//! Decode driver thread.
//!
//! Polls the buffer predicates and asks the decoder for more audio and
//! video while either buffer is below its high-water mark. Sleeps briefly
//! when both are full, and exits once its stop flag is cleared.

use crate::shared::SharedHandle;
use crate::sink::MovieSink;
use moviola_core::Result;
use moviola_media::MovieDecoder;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error, warn};

pub(crate) type SharedDecoder = Arc<Mutex<Box<dyn MovieDecoder>>>;

/// Handle to the decode thread. Stops and joins on drop.
pub struct DecodeDriver {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl DecodeDriver {
    pub(crate) fn start(
        decoder: SharedDecoder,
        shared: SharedHandle,
        idle_interval: Duration,
    ) -> Result<Self> {
        let running = Arc::new(AtomicBool::new(true));
        let sink = MovieSink::new(shared.clone());

        let handle = {
            let running = Arc::clone(&running);
            thread::Builder::new()
                .name("moviola-decode".to_string())
                .spawn(move || run(decoder, shared, sink, running, idle_interval))?
        };

        debug!("Decode driver started");
        Ok(Self {
            running,
            handle: Some(handle),
        })
    }

    /// Ask the thread to exit and wait for it.
    ///
    /// A decode request already in progress is allowed to finish.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Decode driver panicked");
            }
            debug!("Decode driver stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for DecodeDriver {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    decoder: SharedDecoder,
    shared: SharedHandle,
    sink: MovieSink,
    running: Arc<AtomicBool>,
    idle_interval: Duration,
) {
    while running.load(Ordering::Acquire) {
        let (need_audio, need_video) = {
            let shared = shared.lock();
            (shared.needs_more_audio_frames(), shared.needs_more_video_frames())
        };

        if need_audio {
            if let Err(e) = decoder.lock().request_audio_frame(&sink) {
                warn!("Audio decode request failed: {}", e);
            }
        }
        if need_video {
            if let Err(e) = decoder.lock().request_video_frame(&sink) {
                warn!("Video decode request failed: {}", e);
            }
        }

        if !need_audio && !need_video {
            thread::sleep(idle_interval);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PlayerConfig;
    use crate::shared::SharedState;
    use crate::state::PlayerState;
    use moviola_audio::StreamingAudioClip;
    use moviola_core::{MoviolaError, Size};
    use moviola_media::{FrameSink, MediaInfo, StreamType, TestPatternConfig, TestPatternDecoder};
    use std::sync::atomic::AtomicUsize;
    use std::time::Instant;

    struct FailingDecoder {
        requests: Arc<AtomicUsize>,
    }

    impl MovieDecoder for FailingDecoder {
        fn info(&self) -> MediaInfo {
            TestPatternDecoder::new(TestPatternConfig::default())
                .map(|d| d.info())
                .unwrap_or_default()
        }

        fn request_video_frame(&mut self, _sink: &dyn FrameSink) -> Result<()> {
            self.requests.fetch_add(1, Ordering::Relaxed);
            thread::sleep(Duration::from_millis(1));
            Err(MoviolaError::Decoder("corrupt packet".to_string()))
        }

        fn request_audio_frame(&mut self, sink: &dyn FrameSink) -> Result<()> {
            sink.set_eof(StreamType::Audio);
            Ok(())
        }
    }

    fn shared_for(decoder: &dyn MovieDecoder, state: PlayerState) -> SharedHandle {
        let mut shared = SharedState::new(&decoder.info(), &PlayerConfig::default());
        shared.state = state;
        shared.clip = Some(Arc::new(StreamingAudioClip::with_capacity(2, 48_000)));
        Arc::new(Mutex::new(shared))
    }

    #[test]
    fn test_fills_audio_to_high_water() {
        let decoder = TestPatternDecoder::new(TestPatternConfig {
            size: Size::new(8, 8),
            ..Default::default()
        })
        .unwrap();
        let shared = shared_for(&decoder, PlayerState::StartingToPlay);
        let decoder: Box<dyn MovieDecoder> = Box::new(decoder);
        let decoder: SharedDecoder = Arc::new(Mutex::new(decoder));

        let mut driver =
            DecodeDriver::start(decoder, Arc::clone(&shared), Duration::from_millis(2)).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while shared.lock().needs_more_audio_frames() && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        driver.stop();

        let shared = shared.lock();
        let clip = shared.clip.as_ref().unwrap();
        assert!(clip.samples_left() >= 20_000);
        // One chunk past the mark at most
        assert!(clip.samples_left() < 20_000 + 1024);
    }

    #[test]
    fn test_idle_while_paused() {
        let requests = Arc::new(AtomicUsize::new(0));
        let decoder = FailingDecoder {
            requests: Arc::clone(&requests),
        };
        let shared = shared_for(&decoder, PlayerState::Paused);
        let decoder: Box<dyn MovieDecoder> = Box::new(decoder);
        let decoder: SharedDecoder = Arc::new(Mutex::new(decoder));

        let mut driver = DecodeDriver::start(decoder, shared, Duration::from_millis(1)).unwrap();
        thread::sleep(Duration::from_millis(20));
        driver.stop();
        assert_eq!(requests.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_survives_decoder_errors() {
        let requests = Arc::new(AtomicUsize::new(0));
        let decoder = FailingDecoder {
            requests: Arc::clone(&requests),
        };
        let shared = shared_for(&decoder, PlayerState::StartingToPlay);
        let decoder: Box<dyn MovieDecoder> = Box::new(decoder);
        let decoder: SharedDecoder = Arc::new(Mutex::new(decoder));

        let mut driver = DecodeDriver::start(decoder, shared, Duration::from_millis(1)).unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while requests.load(Ordering::Relaxed) < 3 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(driver.is_running());
        driver.stop();
        assert!(requests.load(Ordering::Relaxed) >= 3);
        assert!(!driver.is_running());
    }
}
