//! Decoded frames waiting for their presentation time.

use moviola_core::Time;
use moviola_gpu::Texture;
use std::collections::VecDeque;
use std::sync::Arc;

/// A frame texture and the time it becomes current.
///
/// The texture may still be uploading; check `Texture::is_loaded` before
/// drawing it.
#[derive(Debug, Clone)]
pub struct PendingFrame {
    pub texture: Arc<dyn Texture>,
    pub time: Time,
}

/// FIFO of pending frames in decode order.
#[derive(Debug, Default)]
pub struct FrameQueue {
    frames: VecDeque<PendingFrame>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: PendingFrame) {
        self.frames.push_back(frame);
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Pop the front frame if its time has come.
    ///
    /// Only the front is ever considered, so frames come out in the order
    /// they were pushed even when timestamps are out of order.
    pub fn pop_due(&mut self, clock: Time) -> Option<PendingFrame> {
        if self.frames.front()?.time <= clock {
            self.frames.pop_front()
        } else {
            None
        }
    }

    /// Remove every frame, oldest first.
    pub fn drain(&mut self) -> impl Iterator<Item = PendingFrame> + '_ {
        self.frames.drain(..)
    }
}
