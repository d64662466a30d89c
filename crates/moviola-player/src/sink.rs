//! Where decoders deliver frames and samples.

use crate::ingest::FrameMessage;
use crate::shared::SharedHandle;
use moviola_core::{FrameBuffer, Time};
use moviola_media::{FrameSink, StreamType};
use tracing::{trace, warn};

/// Entry point for decoded media, safe to use from any thread.
///
/// Video frames go to the ingest worker for texture upload. Audio samples
/// go straight into the player's streaming clip. Anything delivered while
/// the player isn't playing is dropped.
#[derive(Clone)]
pub struct MovieSink {
    shared: SharedHandle,
}

impl MovieSink {
    pub(crate) fn new(shared: SharedHandle) -> Self {
        Self { shared }
    }
}

impl FrameSink for MovieSink {
    fn on_video_frame_available(&self, time: Time, frame: FrameBuffer) {
        let tx = {
            let mut shared = self.shared.lock();
            let Some(tx) = shared.ingest_tx.clone() else {
                trace!("Dropping frame at {:.3}s, ingest not running", time);
                return;
            };
            shared.in_flight += 1;
            tx
        };

        // Blocks only if the worker falls behind by a full channel
        if tx.send(FrameMessage { time, frame }).is_err() {
            let mut shared = self.shared.lock();
            shared.in_flight = shared.in_flight.saturating_sub(1);
            trace!("Dropping frame at {:.3}s, ingest stopped", time);
        }
    }

    fn on_audio_frame_available(&self, time: Time, samples: &[f32]) {
        let Some(clip) = self.shared.lock().clip.clone() else {
            trace!("Dropping {} samples at {:.3}s, no clip", samples.len(), time);
            return;
        };

        let accepted = clip.add_interleaved_samples(samples);
        if accepted < samples.len() {
            warn!(
                "Audio clip full, dropped {} of {} samples at {:.3}s",
                samples.len() - accepted,
                samples.len(),
                time
            );
        }
    }

    fn set_eof(&self, stream_type: StreamType) {
        self.shared.lock().set_eof(stream_type);
    }
}
