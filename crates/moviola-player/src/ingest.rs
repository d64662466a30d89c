//! Ingest worker: turns decoded frames into queued textures.
//!
//! Runs on its own thread so texture uploads never block the decoder or
//! the update thread. A queue slot is claimed under the shared lock before
//! the upload starts; the upload itself runs unlocked.

use crate::frame_queue::PendingFrame;
use crate::shared::SharedHandle;
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use moviola_core::{FrameBuffer, Result, Time};
use moviola_gpu::{TextureDescriptor, VideoBackend};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, error};

/// How often a blocked worker rechecks its stop flag.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A decoded frame on its way to the queue.
pub struct FrameMessage {
    pub time: Time,
    pub frame: FrameBuffer,
}

/// Handle to the ingest thread. Stops and joins on drop.
pub struct IngestWorker {
    stop: Arc<AtomicBool>,
    shared: SharedHandle,
    handle: Option<JoinHandle<()>>,
}

impl IngestWorker {
    /// Open the frame channel and start the worker.
    pub(crate) fn start(
        shared: SharedHandle,
        backend: Arc<dyn VideoBackend>,
        capacity: usize,
    ) -> Result<Self> {
        let (tx, rx) = bounded(capacity);
        let stop = Arc::new(AtomicBool::new(false));

        let handle = {
            let shared = Arc::clone(&shared);
            let stop = Arc::clone(&stop);
            thread::Builder::new()
                .name("moviola-video-aux".to_string())
                .spawn(move || run(rx, shared, backend, stop))?
        };

        shared.lock().ingest_tx = Some(tx);
        debug!("Ingest worker started (channel capacity {})", capacity);
        Ok(Self {
            stop,
            shared,
            handle: Some(handle),
        })
    }

    /// Stop accepting frames and wait for the worker to exit.
    ///
    /// Frames still in the channel are discarded.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        self.shared.lock().ingest_tx = None;
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                error!("Ingest worker panicked");
            }
            debug!("Ingest worker stopped");
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }
}

impl Drop for IngestWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(
    rx: Receiver<FrameMessage>,
    shared: SharedHandle,
    backend: Arc<dyn VideoBackend>,
    stop: Arc<AtomicBool>,
) {
    loop {
        if stop.load(Ordering::Acquire) {
            break;
        }
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(message) => {
                if stop.load(Ordering::Acquire) {
                    break;
                }
                ingest(&shared, backend.as_ref(), message);
            }
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!("Ingest worker exiting");
}

fn ingest(shared: &SharedHandle, backend: &dyn VideoBackend, message: FrameMessage) {
    let FrameMessage { time, frame } = message;
    let size = frame.size();

    let texture = {
        let mut shared = shared.lock();
        shared.in_flight = shared.in_flight.saturating_sub(1);
        let texture = match shared.recycle.acquire_or_create(backend, size) {
            Ok(texture) => texture,
            Err(e) => {
                error!("Failed to get a {} texture for frame at {:.3}s: {}", size, time, e);
                return;
            }
        };
        texture.start_loading();
        shared.queue.push(PendingFrame {
            texture: Arc::clone(&texture),
            time,
        });
        texture
    };

    if let Err(e) = texture.load(TextureDescriptor::from_frame(frame)) {
        error!("Failed to upload frame at {:.3}s: {}", time, e);
        return;
    }
    debug!("Queued frame at {:.3}s ({})", time, size);
}
